//! # plotstyle-yaml
//!
//! YAML parsing for plotstyle documents.
//!
//! Documents are parsed into a [`YamlNode`] tree in a single pass over the
//! `yaml-rust2` event stream. Every node carries its [`SourceInfo`] and, when
//! the source attached one, the suffix of its local tag (`!explicit` is kept
//! as `"explicit"`). Tags are recorded but never interpreted here: deciding
//! what a tag means is left to the consumer, so parsing stays a generic
//! first phase.
//!
//! ## Example
//!
//! ```rust
//! use plotstyle_yaml::parse;
//!
//! let doc = parse("title: !explicit {value: Report}").unwrap();
//! let title = doc.get("title").unwrap();
//! assert_eq!(title.tag.as_deref(), Some("explicit"));
//! assert!(title.is_mapping());
//! ```

mod error;
mod node;
mod parser;
mod source_info;

pub use error::{Error, Result};
pub use node::{YamlNode, YamlValue};
pub use parser::{parse, parse_file};
pub use source_info::SourceInfo;
