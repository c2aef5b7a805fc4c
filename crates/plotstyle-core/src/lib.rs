//! Layered field resolution for plotstyle documents.
//!
//! A style is described by YAML documents whose top-level entries are field
//! declarations. Documents are merged one field at a time into a single
//! scope; a field may carry a validator, reference another field, pull in
//! other documents (chain-include), be decorated with a prefix or suffix,
//! and hold per-language variants.
//!
//! # Key Features
//!
//! - **Per-field isolation**: a field that fails is reported as a
//!   [`Diagnostic`] and left out; the rest of the style still resolves
//! - **References**: `source: field` reads an already resolved field,
//!   which is then deleted from the output unless kept
//! - **Templates**: a `configs` entry expands one base document into
//!   several styles
//!
//! # Example
//!
//! ```rust,no_run
//! use plotstyle_core::{ResolveOptions, StyleLoader, LoadedStyle};
//!
//! let loader = StyleLoader::with_options(ResolveOptions::default())?;
//! match loader.from_path("paper.yaml")? {
//!     LoadedStyle::Single(style) => println!("{:?}", style.get("fontsize")),
//!     LoadedStyle::Template(template) => {
//!         for style in template.expand() {
//!             println!("{} fields", style?.len());
//!         }
//!     }
//! }
//! # Ok::<(), plotstyle_core::ResolveError>(())
//! ```

mod affix;
mod context;
mod descriptor;
mod diagnostic;
mod document;
mod error;
mod keep;
mod loader;
mod localize;
mod options;
mod resolve;
mod style;
mod template;
mod validator;
mod value;

pub use affix::{AffixKind, AffixRegistry};
pub use context::ParseContext;
pub use descriptor::{
    CHAIN_INCLUDE_VALIDATOR, DEFAULT_VALIDATOR, FieldDescriptor, KeepOverride, Source, keys,
};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use document::{DocumentLocator, load_document, parse_document, value_from_yaml};
pub use error::{ResolveError, Result};
pub use keep::infer_deletions;
pub use loader::{LoadedStyle, StyleLoader};
pub use localize::{localize, localize_mapping};
pub use options::{DEFAULT_DOCUMENTS_ROOT, DEFAULT_LANGUAGE, DEFAULT_MAX_DEPTH, ResolveOptions};
pub use resolve::Scope;
pub use style::ResolvedStyle;
pub use template::{Expansion, StyleTemplate};
pub use validator::{
    BoolValidator, ChoiceValidator, DictValidator, FieldParser, FigsizeValidator,
    FilenameValidator, FloatValidator, FontsizeValidator, GridoptionsValidator, IntValidator,
    LinewidthValidator, PathstrValidator, PlotoptionsValidator, StrValidator,
    UndeterminedValidator, ValidationContext, Validator, ValidatorRegistry, YamlValidator,
};
pub use value::{FieldIntent, Mapping, TaggedValue, Value};

// Re-export for convenience
pub use plotstyle_yaml::SourceInfo;
