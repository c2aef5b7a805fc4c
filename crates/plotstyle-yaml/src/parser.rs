//! YAML parser that builds [`YamlNode`] trees.

use crate::{Error, Result, SourceInfo, YamlNode, YamlValue};
use indexmap::IndexMap;
use std::collections::HashMap;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser, Tag};
use yaml_rust2::scanner::{Marker, TScalarStyle};

/// Parse a single YAML document into a [`YamlNode`] tree.
///
/// Empty input yields a null node. If the input contains multiple
/// documents, only the first one is parsed.
///
/// # Errors
///
/// Returns an error for invalid YAML, non-scalar mapping keys, duplicate
/// keys, and scalars whose core tag (`!!int`, `!!float`, `!!bool`) does not
/// match their text.
pub fn parse(content: &str) -> Result<YamlNode> {
    parse_impl(content, None)
}

/// Parse YAML with an associated filename, which is recorded in the source
/// location of every node.
///
/// ```rust
/// use plotstyle_yaml::parse_file;
///
/// let doc = parse_file("title: Test", "style.yaml").unwrap();
/// assert_eq!(doc.source_info.file.as_deref(), Some("style.yaml"));
/// ```
pub fn parse_file(content: &str, filename: &str) -> Result<YamlNode> {
    parse_impl(content, Some(filename))
}

fn parse_impl(content: &str, filename: Option<&str>) -> Result<YamlNode> {
    let mut parser = Parser::new_from_str(content);
    let mut builder = YamlBuilder::new(filename);

    parser
        .load(&mut builder, false) // false = single document only
        .map_err(|e| with_file(Error::from(e), filename))?;

    builder.result()
}

fn with_file(err: Error, filename: Option<&str>) -> Error {
    match (err, filename) {
        (Error::ParseError { message, location }, Some(file)) => Error::ParseError {
            message,
            location: location.map(|l| l.with_file(file)),
        },
        (err, _) => err,
    }
}

/// Builder that implements MarkedEventReceiver to construct a YamlNode tree.
struct YamlBuilder {
    filename: Option<String>,

    /// Stack of collections being constructed
    stack: Vec<BuildNode>,

    /// Completed anchored nodes, by anchor id
    anchors: HashMap<usize, YamlNode>,

    /// The completed root node
    root: Option<YamlNode>,

    /// First structural error; events after it are ignored
    error: Option<Error>,
}

enum BuildNode {
    Sequence {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        items: Vec<YamlNode>,
    },
    Mapping {
        start_marker: Marker,
        anchor_id: usize,
        tag: Option<String>,
        entries: IndexMap<String, YamlNode>,
        pending_key: Option<String>,
    },
}

/// How a tag attached to a node should be treated.
enum TagKind {
    /// `!name`: kept on the node for the consumer
    Local(String),
    /// `!!name`: forces the scalar type
    Core(String),
}

fn classify_tag(tag: Option<Tag>) -> Option<TagKind> {
    let tag = tag?;
    match tag.handle.as_str() {
        "!" => Some(TagKind::Local(tag.suffix)),
        "!!" | "tag:yaml.org,2002:" => Some(TagKind::Core(tag.suffix)),
        _ => Some(TagKind::Local(format!("{}{}", tag.handle, tag.suffix))),
    }
}

impl YamlBuilder {
    fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(|s| s.to_string()),
            stack: Vec::new(),
            anchors: HashMap::new(),
            root: None,
            error: None,
        }
    }

    fn result(self) -> Result<YamlNode> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let mut source_info = SourceInfo::default();
        source_info.file = self.filename;
        Ok(self
            .root
            .unwrap_or_else(|| YamlNode::new(YamlValue::Null, source_info)))
    }

    fn make_source_info(&self, marker: &Marker, len: usize) -> SourceInfo {
        let mut info = SourceInfo::from_marker(marker, len);
        if let Some(ref filename) = self.filename {
            info = info.with_file(filename.clone());
        }
        info
    }

    fn fail(&mut self, message: impl Into<String>, location: SourceInfo) {
        if self.error.is_none() {
            self.error = Some(Error::InvalidStructure {
                message: message.into(),
                location: Some(location),
            });
        }
    }

    /// True when the next completed node would be a mapping key.
    fn expecting_key(&self) -> bool {
        matches!(
            self.stack.last(),
            Some(BuildNode::Mapping {
                pending_key: None,
                ..
            })
        )
    }

    fn remember_anchor(&mut self, anchor_id: usize, node: &YamlNode) {
        if anchor_id > 0 {
            self.anchors.insert(anchor_id, node.clone());
        }
    }

    fn push_key(&mut self, key: String, source_info: SourceInfo) {
        let duplicate = match self.stack.last_mut() {
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => {
                if entries.contains_key(&key) {
                    true
                } else {
                    *pending_key = Some(key.clone());
                    false
                }
            }
            _ => false,
        };
        if duplicate {
            self.fail(format!("duplicate mapping key '{}'", key), source_info);
        }
    }

    fn push_complete(&mut self, node: YamlNode) {
        match self.stack.last_mut() {
            None => {
                self.root = Some(node);
            }
            Some(BuildNode::Sequence { items, .. }) => {
                items.push(node);
            }
            Some(BuildNode::Mapping {
                entries,
                pending_key,
                ..
            }) => {
                if let Some(key) = pending_key.take() {
                    entries.insert(key, node);
                }
            }
        }
    }

    fn on_scalar(&mut self, text: String, style: TScalarStyle, anchor_id: usize, tag: Option<Tag>, marker: Marker) {
        let source_info = self.make_source_info(&marker, text.len());

        // Tags on keys are dropped; keys are always their source text.
        if self.expecting_key() {
            self.push_key(text, source_info);
            return;
        }

        let (value, local_tag) = match classify_tag(tag) {
            Some(TagKind::Core(suffix)) => match core_scalar(&suffix, &text) {
                Ok(value) => (value, None),
                Err(message) => {
                    self.fail(message, source_info);
                    return;
                }
            },
            Some(TagKind::Local(name)) => (typed_scalar(text, style), Some(name)),
            None => (typed_scalar(text, style), None),
        };

        let mut node = YamlNode::new(value, source_info);
        node.tag = local_tag;
        self.remember_anchor(anchor_id, &node);
        self.push_complete(node);
    }

    fn on_collection_start(&mut self, mapping: bool, anchor_id: usize, tag: Option<Tag>, marker: Marker) {
        if self.expecting_key() {
            let location = self.make_source_info(&marker, 0);
            self.fail("mapping keys must be scalars", location);
            return;
        }
        let tag = match classify_tag(tag) {
            Some(TagKind::Local(name)) => Some(name),
            _ => None,
        };
        let node = if mapping {
            BuildNode::Mapping {
                start_marker: marker,
                anchor_id,
                tag,
                entries: IndexMap::new(),
                pending_key: None,
            }
        } else {
            BuildNode::Sequence {
                start_marker: marker,
                anchor_id,
                tag,
                items: Vec::new(),
            }
        };
        self.stack.push(node);
    }

    fn on_collection_end(&mut self, marker: Marker) {
        let Some(build_node) = self.stack.pop() else {
            return;
        };
        let (start_marker, anchor_id, tag, value) = match build_node {
            BuildNode::Sequence {
                start_marker,
                anchor_id,
                tag,
                items,
            } => (start_marker, anchor_id, tag, YamlValue::Sequence(items)),
            BuildNode::Mapping {
                start_marker,
                anchor_id,
                tag,
                entries,
                ..
            } => (start_marker, anchor_id, tag, YamlValue::Mapping(entries)),
        };
        let len = marker.index().saturating_sub(start_marker.index());
        let mut node = YamlNode::new(value, self.make_source_info(&start_marker, len));
        node.tag = tag;
        self.remember_anchor(anchor_id, &node);
        self.push_complete(node);
    }

    fn on_alias(&mut self, anchor_id: usize, marker: Marker) {
        let location = self.make_source_info(&marker, 0);
        let Some(anchored) = self.anchors.get(&anchor_id).cloned() else {
            self.fail("alias refers to an unknown anchor", location);
            return;
        };
        if self.expecting_key() {
            match &anchored.value {
                YamlValue::String(s) => {
                    let key = s.clone();
                    self.push_key(key, location);
                }
                _ => self.fail("mapping keys must be scalars", location),
            }
            return;
        }
        self.push_complete(anchored);
    }
}

impl MarkedEventReceiver for YamlBuilder {
    fn on_event(&mut self, ev: Event, marker: Marker) {
        if self.error.is_some() {
            return;
        }
        match ev {
            Event::Nothing
            | Event::StreamStart
            | Event::StreamEnd
            | Event::DocumentStart
            | Event::DocumentEnd => {}

            Event::Scalar(value, style, anchor_id, tag) => {
                self.on_scalar(value, style, anchor_id, tag, marker);
            }

            Event::SequenceStart(anchor_id, tag) => {
                self.on_collection_start(false, anchor_id, tag, marker);
            }
            Event::MappingStart(anchor_id, tag) => {
                self.on_collection_start(true, anchor_id, tag, marker);
            }

            Event::SequenceEnd | Event::MappingEnd => {
                self.on_collection_end(marker);
            }

            Event::Alias(anchor_id) => {
                self.on_alias(anchor_id, marker);
            }
        }
    }
}

/// Only plain scalars are subject to type inference; quoted and block
/// scalars are always strings.
fn typed_scalar(text: String, style: TScalarStyle) -> YamlValue {
    if style == TScalarStyle::Plain {
        infer_plain_scalar(text)
    } else {
        YamlValue::String(text)
    }
}

/// Parse a plain scalar string into the appropriate type.
fn infer_plain_scalar(text: String) -> YamlValue {
    match text.as_str() {
        "null" | "Null" | "NULL" | "~" | "" => return YamlValue::Null,
        "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "on" | "On" | "ON" => {
            return YamlValue::Bool(true);
        }
        "false" | "False" | "FALSE" | "no" | "No" | "NO" | "off" | "Off" | "OFF" => {
            return YamlValue::Bool(false);
        }
        _ => {}
    }

    if let Ok(i) = text.parse::<i64>() {
        return YamlValue::Integer(i);
    }
    if let Some(f) = parse_float(&text) {
        return YamlValue::Real(f);
    }
    YamlValue::String(text)
}

fn parse_float(text: &str) -> Option<f64> {
    match text {
        ".inf" | ".Inf" | ".INF" | "+.inf" | "+.Inf" | "+.INF" => return Some(f64::INFINITY),
        "-.inf" | "-.Inf" | "-.INF" => return Some(f64::NEG_INFINITY),
        ".nan" | ".NaN" | ".NAN" => return Some(f64::NAN),
        _ => {}
    }
    // Rust accepts "inf" and "nan" spellings that YAML treats as strings.
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse::<f64>().ok()
}

fn core_scalar(suffix: &str, text: &str) -> std::result::Result<YamlValue, String> {
    let mismatch = || format!("'{}' is not a valid !!{}", text, suffix);
    match suffix {
        "str" => Ok(YamlValue::String(text.to_string())),
        "null" => Ok(YamlValue::Null),
        "int" => text.parse::<i64>().map(YamlValue::Integer).map_err(|_| mismatch()),
        "float" => text
            .parse::<i64>()
            .map(|i| i as f64)
            .ok()
            .or_else(|| parse_float(text))
            .map(YamlValue::Real)
            .ok_or_else(mismatch),
        "bool" => match infer_plain_scalar(text.to_string()) {
            YamlValue::Bool(b) => Ok(YamlValue::Bool(b)),
            _ => Err(mismatch()),
        },
        _ => Ok(infer_plain_scalar(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse("hello").unwrap().as_str(), Some("hello"));
        assert_eq!(parse("42").unwrap().as_i64(), Some(42));
        assert_eq!(parse("2.5").unwrap().as_f64(), Some(2.5));
        assert_eq!(parse("yes").unwrap().as_bool(), Some(true));
        assert!(parse("~").unwrap().is_null());
    }

    #[test]
    fn test_quoted_scalars_stay_strings() {
        let doc = parse("a: '42'\nb: \"true\"\nc: |\n  10\n").unwrap();
        assert_eq!(doc.get("a").unwrap().as_str(), Some("42"));
        assert_eq!(doc.get("b").unwrap().as_str(), Some("true"));
        assert_eq!(doc.get("c").unwrap().as_str(), Some("10\n"));
    }

    #[test]
    fn test_words_that_rust_parses_as_floats() {
        assert_eq!(parse("inf").unwrap().as_str(), Some("inf"));
        assert_eq!(parse("NaN").unwrap().as_str(), Some("NaN"));
        assert_eq!(parse(".inf").unwrap().as_f64(), Some(f64::INFINITY));
    }

    #[test]
    fn test_empty_document_is_null() {
        assert!(parse("").unwrap().is_null());
        assert!(parse("# only a comment\n").unwrap().is_null());
    }

    #[test]
    fn test_mapping_preserves_order() {
        let doc = parse("zeta: 1\nalpha: 2\nmid: 3").unwrap();
        let keys: Vec<&str> = doc.as_mapping().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_keys_use_source_text() {
        let doc = parse("1: one\ntrue: yes").unwrap();
        assert!(doc.get("1").is_some());
        assert!(doc.get("true").is_some());
    }

    #[test]
    fn test_local_tags_are_recorded() {
        let doc = parse(
            r#"
size: !implicit 12
title: !explicit
  value: Report
  source: literal
items: !implicit [1, 2]
"#,
        )
        .unwrap();
        let size = doc.get("size").unwrap();
        assert_eq!(size.tag.as_deref(), Some("implicit"));
        assert_eq!(size.as_i64(), Some(12));

        let title = doc.get("title").unwrap();
        assert_eq!(title.tag.as_deref(), Some("explicit"));
        assert_eq!(title.get("value").unwrap().as_str(), Some("Report"));

        assert_eq!(doc.get("items").unwrap().tag.as_deref(), Some("implicit"));
        assert!(doc.get("items").unwrap().is_sequence());
    }

    #[test]
    fn test_core_tags_force_type() {
        let doc = parse("a: !!str 10\nb: !!float 3\nc: !!int '7'").unwrap();
        assert_eq!(doc.get("a").unwrap().as_str(), Some("10"));
        assert_eq!(doc.get("b").unwrap().as_f64(), Some(3.0));
        assert_eq!(doc.get("c").unwrap().as_i64(), Some(7));
        assert_eq!(doc.get("a").unwrap().tag, None);
    }

    #[test]
    fn test_core_tag_mismatch_is_error() {
        let err = parse("a: !!int ten").unwrap_err();
        assert!(matches!(err, Error::InvalidStructure { .. }));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let err = parse("a: 1\na: 2").unwrap_err();
        assert!(err.to_string().contains("duplicate mapping key 'a'"));
    }

    #[test]
    fn test_complex_keys_rejected() {
        let err = parse("? [a, b]\n: 1").unwrap_err();
        assert!(err.to_string().contains("mapping keys must be scalars"));
    }

    #[test]
    fn test_anchors_and_aliases() {
        let doc = parse("base: &b {value: 10}\ncopy: *b").unwrap();
        assert_eq!(doc.get("copy"), doc.get("base"));
    }

    #[test]
    fn test_syntax_error_carries_location() {
        let err = parse_file("a: [1, 2", "broken.yaml").unwrap_err();
        let location = err.location().unwrap();
        assert_eq!(location.file.as_deref(), Some("broken.yaml"));
    }

    #[test]
    fn test_source_info_tracking() {
        let doc = parse_file("title: My Document\nsize: 3", "style.yaml").unwrap();
        let size = doc.get("size").unwrap();
        assert_eq!(size.source_info.line, 2);
        assert_eq!(size.source_info.col, 7);
        assert_eq!(size.source_info.file.as_deref(), Some("style.yaml"));
    }
}
