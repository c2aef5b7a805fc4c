//! Prefix and suffix decorations.

use crate::diagnostic::{Diagnostic, report};
use crate::error::ResolveError;
use crate::localize::localize;
use crate::value::{Mapping, Value};
use indexmap::IndexMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AffixKind {
    Prefix,
    Suffix,
}

impl AffixKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AffixKind::Prefix => "prefix",
            AffixKind::Suffix => "suffix",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Decorations {
    prefix: Option<Value>,
    suffix: Option<Value>,
}

/// Parsed decoration values, by decorated field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AffixRegistry {
    entries: IndexMap<String, Decorations>,
}

impl AffixRegistry {
    pub fn insert(&mut self, field: &str, kind: AffixKind, value: Value) {
        let slot = self.entries.entry(field.to_string()).or_default();
        match kind {
            AffixKind::Prefix => slot.prefix = Some(value),
            AffixKind::Suffix => slot.suffix = Some(value),
        }
    }

    /// Forget every decoration registered for `field`.
    pub fn clear(&mut self, field: &str) {
        self.entries.shift_remove(field);
    }

    pub fn get(&self, field: &str, kind: AffixKind) -> Option<&Value> {
        let slot = self.entries.get(field)?;
        match kind {
            AffixKind::Prefix => slot.prefix.as_ref(),
            AffixKind::Suffix => slot.suffix.as_ref(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn localize(&mut self, language: &str) {
        for slot in self.entries.values_mut() {
            for value in [&mut slot.prefix, &mut slot.suffix].into_iter().flatten() {
                *value = localize(std::mem::take(value), language);
            }
        }
    }

    /// Decorate `values` in place: prefix first, then suffix around the
    /// result. A decoration that cannot be concatenated is reported and
    /// skipped, leaving the value as it was.
    pub fn apply(&self, values: &mut Mapping, diagnostics: &mut Vec<Diagnostic>) {
        for (field, slot) in &self.entries {
            let Some(target) = values.get_mut(field) else {
                continue;
            };
            for (kind, affix) in [(AffixKind::Prefix, &slot.prefix), (AffixKind::Suffix, &slot.suffix)] {
                let Some(affix) = affix else {
                    continue;
                };
                match concat(kind, target, affix) {
                    Ok(decorated) => *target = decorated,
                    Err(err) => report(
                        diagnostics,
                        Diagnostic::warning(format!("{}.{}", field, kind.as_str()), err.to_string()),
                    ),
                }
            }
        }
    }
}

fn concat(kind: AffixKind, value: &Value, affix: &Value) -> Result<Value, ResolveError> {
    let (head, tail) = match kind {
        AffixKind::Prefix => (affix, value),
        AffixKind::Suffix => (value, affix),
    };
    match (head, tail) {
        (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
        (Value::Sequence(a), Value::Sequence(b)) => {
            Ok(Value::Sequence(a.iter().chain(b.iter()).cloned().collect()))
        }
        _ => Err(ResolveError::AffixTypeMismatch {
            kind: kind.as_str(),
            value_type: value.type_name(),
            affix_type: affix.type_name(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping;

    #[test]
    fn test_prefix_then_suffix() {
        let mut registry = AffixRegistry::default();
        registry.insert("name", AffixKind::Suffix, Value::from("_v2"));
        registry.insert("name", AffixKind::Prefix, Value::from("Q3 "));
        let mut values = mapping! { "name" => "Report" };
        let mut diagnostics = Vec::new();
        registry.apply(&mut values, &mut diagnostics);
        assert_eq!(values["name"], Value::from("Q3 Report_v2"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_sequences_concatenate() {
        let mut registry = AffixRegistry::default();
        registry.insert("ticks", AffixKind::Prefix, Value::Sequence(vec![Value::Int(0)]));
        let mut values = mapping! { "ticks" => vec![Value::Int(1), Value::Int(2)] };
        registry.apply(&mut values, &mut Vec::new());
        assert_eq!(values["ticks"], Value::Sequence(vec![Value::Int(0), Value::Int(1), Value::Int(2)]));
    }

    #[test]
    fn test_mismatch_leaves_value() {
        let mut registry = AffixRegistry::default();
        registry.insert("size", AffixKind::Suffix, Value::from("pt"));
        let mut values = mapping! { "size" => 10_i64 };
        let mut diagnostics = Vec::new();
        registry.apply(&mut values, &mut diagnostics);
        assert_eq!(values["size"], Value::Int(10));
        assert_eq!(diagnostics.len(), 1);
        insta::assert_snapshot!(diagnostics[0].to_string(), @"field 'size.suffix' was ignored: cannot apply suffix of type string to value of type int");
    }

    #[test]
    fn test_localize_decorations() {
        let mut registry = AffixRegistry::default();
        registry.insert(
            "title",
            AffixKind::Suffix,
            Value::Mapping(mapping! { "en" => " (draft)", "pt" => " (rascunho)" }),
        );
        registry.localize("pt");
        assert_eq!(registry.get("title", AffixKind::Suffix), Some(&Value::from(" (rascunho)")));
    }

    #[test]
    fn test_clear() {
        let mut registry = AffixRegistry::default();
        registry.insert("a", AffixKind::Prefix, Value::from("x"));
        registry.clear("a");
        assert!(registry.is_empty());
    }
}
