//! Dynamic values flowing through resolution.

use indexmap::IndexMap;
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

/// Ordered mapping with unique string keys.
pub type Mapping = IndexMap<String, Value>;

/// Intent attached to a raw node by an `!implicit` or `!explicit` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldIntent {
    /// The payload is the value itself.
    Implicit,
    /// The payload is a descriptor mapping with a `value` entry.
    Explicit,
}

impl FieldIntent {
    /// Map a local tag name to an intent.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "implicit" => Some(FieldIntent::Implicit),
            "explicit" => Some(FieldIntent::Explicit),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldIntent::Implicit => "implicit",
            FieldIntent::Explicit => "explicit",
        }
    }
}

/// A raw node annotated with an intent tag.
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedValue {
    pub intent: FieldIntent,
    pub value: Value,
}

/// A document value, before or after validation.
///
/// `Tagged` only appears in raw document input; validator output never
/// contains it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Mapping(Mapping),
    Tagged(Box<TaggedValue>),
}

impl Value {
    pub fn tagged(intent: FieldIntent, value: Value) -> Self {
        Value::Tagged(Box::new(TaggedValue { intent, value }))
    }

    /// The payload with any intent tag removed (outermost only).
    pub fn untagged(&self) -> &Value {
        match self {
            Value::Tagged(tagged) => tagged.value.untagged(),
            other => other,
        }
    }

    /// Remove intent tags at every depth.
    pub fn into_untagged(self) -> Value {
        match self {
            Value::Tagged(tagged) => tagged.value.into_untagged(),
            Value::Sequence(items) => {
                Value::Sequence(items.into_iter().map(Value::into_untagged).collect())
            }
            Value::Mapping(entries) => Value::Mapping(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_untagged()))
                    .collect(),
            ),
            other => other,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self.untagged(), Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.untagged() {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.untagged() {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self.untagged() {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of an `Int` or `Float`.
    pub fn as_f64(&self) -> Option<f64> {
        match self.untagged() {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self.untagged() {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self.untagged() {
            Value::Mapping(entries) => Some(entries),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_mapping().and_then(|m| m.get(key))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Mapping(_) => "mapping",
            Value::Tagged(_) => "tagged",
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}

impl From<Mapping> for Value {
    fn from(entries: Mapping) -> Self {
        Value::Mapping(entries)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Sequence(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Mapping(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Tagged(tagged) => tagged.value.serialize(serializer),
        }
    }
}

/// Build a [`Mapping`] from `key => value` pairs.
///
/// ```rust
/// use plotstyle_core::{mapping, Value};
///
/// let m = mapping! { "size" => 10_i64, "label" => "Report" };
/// assert_eq!(m["label"], Value::from("Report"));
/// ```
#[macro_export]
macro_rules! mapping {
    () => { $crate::Mapping::new() };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut m = $crate::Mapping::new();
        $( m.insert(::std::string::String::from($key), $crate::Value::from($value)); )+
        m
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_strips_nested_tags() {
        let inner = Value::tagged(FieldIntent::Implicit, Value::Int(3));
        let value = Value::Sequence(vec![inner, Value::from("x")]);
        assert_eq!(
            value.into_untagged(),
            Value::Sequence(vec![Value::Int(3), Value::from("x")])
        );
    }

    #[test]
    fn test_accessors_see_through_tags() {
        let value = Value::tagged(FieldIntent::Explicit, Value::from("a"));
        assert_eq!(value.as_str(), Some("a"));
        assert_eq!(value.type_name(), "tagged");
    }

    #[test]
    fn test_as_f64_accepts_ints() {
        assert_eq!(Value::Int(2).as_f64(), Some(2.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_intent_from_tag() {
        assert_eq!(FieldIntent::from_tag("explicit"), Some(FieldIntent::Explicit));
        assert_eq!(FieldIntent::from_tag("prefer"), None);
    }
}
