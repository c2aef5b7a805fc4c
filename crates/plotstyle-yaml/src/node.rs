//! Document tree produced by the parser.

use crate::SourceInfo;
use indexmap::IndexMap;

/// A parsed YAML value.
///
/// Mapping keys are the source text of scalar keys, in document order.
#[derive(Debug, Clone, PartialEq)]
pub enum YamlValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f64),
    String(String),
    Sequence(Vec<YamlNode>),
    Mapping(IndexMap<String, YamlNode>),
}

/// A YAML value together with where it came from and the local tag the
/// source attached to it, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct YamlNode {
    pub value: YamlValue,

    /// Suffix of a local tag (`!name` is stored as `"name"`). Core schema
    /// tags such as `!!str` are applied during parsing and not kept.
    pub tag: Option<String>,

    pub source_info: SourceInfo,
}

impl YamlNode {
    pub fn new(value: YamlValue, source_info: SourceInfo) -> Self {
        Self {
            value,
            tag: None,
            source_info,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn is_null(&self) -> bool {
        matches!(self.value, YamlValue::Null)
    }

    pub fn is_scalar(&self) -> bool {
        !matches!(self.value, YamlValue::Sequence(_) | YamlValue::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self.value, YamlValue::Sequence(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self.value, YamlValue::Mapping(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            YamlValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.value {
            YamlValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self.value {
            YamlValue::Real(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            YamlValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[YamlNode]> {
        match &self.value {
            YamlValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, YamlNode>> {
        match &self.value {
            YamlValue::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    /// Look up a key when this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&YamlNode> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    /// Number of children for collections, 0 for scalars.
    pub fn len(&self) -> usize {
        match &self.value {
            YamlValue::Sequence(items) => items.len(),
            YamlValue::Mapping(entries) => entries.len(),
            _ => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Short name of the value kind, for messages.
    pub fn kind_name(&self) -> &'static str {
        match self.value {
            YamlValue::Null => "null",
            YamlValue::Bool(_) => "bool",
            YamlValue::Integer(_) => "integer",
            YamlValue::Real(_) => "float",
            YamlValue::String(_) => "string",
            YamlValue::Sequence(_) => "sequence",
            YamlValue::Mapping(_) => "mapping",
        }
    }
}
