//! Validators whose values contain nested field declarations.
//!
//! These call back into the resolver through the context's
//! [`FieldParser`](super::FieldParser). A failure of any nested field fails
//! the composite value; failures are collected rather than stopping at the
//! first one, and only fatal errors pass through unwrapped.

use super::{ValidationContext, Validator};
use crate::error::{ResolveError, Result};
use crate::mapping;
use crate::value::{Mapping, Value};

type Failures = Vec<(String, ResolveError)>;

fn missing_parser(name: &str) -> ResolveError {
    ResolveError::invalid(name, "nested fields cannot be resolved in this context")
}

/// Resolve one nested declaration, recording its failure under `label`.
fn parse_one(
    ctx: &mut ValidationContext<'_>,
    name: &str,
    key: &str,
    raw: &Value,
    label: String,
    failures: &mut Failures,
) -> Result<Option<Value>> {
    let parser = ctx.field_parser().ok_or_else(|| missing_parser(name))?;
    match parser.parse_fields(&mapping! { key => raw.clone() }) {
        Ok(mut parsed) => Ok(parsed.swap_remove(key)),
        Err(err) => match err.into_fatal() {
            Ok(fatal) => Err(fatal),
            Err(ResolveError::NestedFields { failures: inner }) => {
                failures.extend(inner);
                Ok(None)
            }
            Err(other) => {
                failures.push((label, other));
                Ok(None)
            }
        },
    }
}

fn finish(name: &str, failures: Failures, value: Value) -> Result<Value> {
    if failures.is_empty() {
        Ok(value)
    } else {
        Err(ResolveError::invalid(
            name,
            ResolveError::NestedFields { failures }.to_string(),
        ))
    }
}

/// A mapping whose entries are independent field declarations.
pub struct DictValidator;

impl Validator for DictValidator {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        value.as_mapping().is_some() && ctx.has_field_parser()
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        let entries = value
            .as_mapping()
            .ok_or_else(|| ResolveError::invalid("dict", format!("expected a mapping, got {}", value.type_name())))?;

        let mut parsed = Mapping::new();
        let mut failures = Failures::new();
        for (key, raw) in entries {
            if let Some(v) = parse_one(ctx, "dict", key, raw, key.clone(), &mut failures)? {
                parsed.insert(key.clone(), v);
            }
        }
        finish("dict", failures, Value::Mapping(parsed))
    }

    fn fallback(&self) -> Value {
        Value::Mapping(Mapping::new())
    }
}

/// A sequence of mappings; each entry of each mapping is a field
/// declaration given in mapping form.
pub struct GridoptionsValidator;

impl GridoptionsValidator {
    fn items(value: &Value) -> Option<Vec<&Mapping>> {
        value
            .as_sequence()?
            .iter()
            .map(|item| {
                let entries = item.as_mapping()?;
                entries.values().all(|v| v.as_mapping().is_some()).then_some(entries)
            })
            .collect()
    }
}

impl Validator for GridoptionsValidator {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        Self::items(value).is_some() && ctx.has_field_parser()
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        let items = Self::items(value).ok_or_else(|| {
            ResolveError::invalid("gridoptions", "expected a sequence of mappings of field declarations")
        })?;

        let mut parsed = Vec::with_capacity(items.len());
        let mut failures = Failures::new();
        for (index, entries) in items.into_iter().enumerate() {
            let mut item = Mapping::new();
            for (key, raw) in entries {
                let label = format!("[{}].{}", index, key);
                if let Some(v) = parse_one(ctx, "gridoptions", key, raw, label, &mut failures)? {
                    item.insert(key.clone(), v);
                }
            }
            parsed.push(Value::Mapping(item));
        }
        finish("gridoptions", failures, Value::Sequence(parsed))
    }

    fn fallback(&self) -> Value {
        Value::Sequence(Vec::new())
    }
}

/// A mapping resolved as one nested group, so its declarations may
/// reference each other.
pub struct PlotoptionsValidator;

impl Validator for PlotoptionsValidator {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        value.as_mapping().is_some() && ctx.has_field_parser()
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        let entries = value.as_mapping().ok_or_else(|| {
            ResolveError::invalid("plotoptions", format!("expected a mapping, got {}", value.type_name()))
        })?;
        let parser = ctx.field_parser().ok_or_else(|| missing_parser("plotoptions"))?;
        match parser.parse_fields(entries) {
            Ok(parsed) => Ok(Value::Mapping(parsed)),
            Err(err) => match err.into_fatal() {
                Ok(fatal) => Err(fatal),
                Err(err) => Err(ResolveError::invalid("plotoptions", err.to_string())),
            },
        }
    }

    fn fallback(&self) -> Value {
        Value::Mapping(Mapping::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::FieldParser;

    /// Resolves nested declarations by taking `value` entries as-is and
    /// failing on anything named `bad`.
    struct Recording {
        calls: Vec<Vec<String>>,
    }

    impl FieldParser for Recording {
        fn parse_fields(&mut self, fields: &Mapping) -> Result<Mapping> {
            self.calls.push(fields.keys().cloned().collect());
            let mut out = Mapping::new();
            let mut failures = Vec::new();
            for (key, raw) in fields {
                if key == "bad" {
                    failures.push((key.clone(), ResolveError::schema("bad field")));
                } else {
                    out.insert(key.clone(), raw.get("value").cloned().unwrap_or(raw.clone()));
                }
            }
            if failures.is_empty() {
                Ok(out)
            } else {
                Err(ResolveError::NestedFields { failures })
            }
        }
    }

    fn declaration(v: i64) -> Value {
        Value::Mapping(mapping! { "value" => v })
    }

    #[test]
    fn test_dict_calls_once_per_key() {
        let mut parser = Recording { calls: Vec::new() };
        let value = Value::Mapping(mapping! { "a" => declaration(1), "b" => declaration(2) });
        let parsed = {
            let mut ctx = ValidationContext::with_field_parser(&mut parser);
            DictValidator.parse(&value, &mut ctx).unwrap()
        };
        assert_eq!(parsed, Value::Mapping(mapping! { "a" => 1_i64, "b" => 2_i64 }));
        assert_eq!(parser.calls, vec![vec!["a".to_string()], vec!["b".to_string()]]);
    }

    #[test]
    fn test_dict_aggregates_failures() {
        let mut parser = Recording { calls: Vec::new() };
        let value = Value::Mapping(mapping! { "bad" => declaration(1), "ok" => declaration(2) });
        let mut ctx = ValidationContext::with_field_parser(&mut parser);
        let err = DictValidator.parse(&value, &mut ctx).unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"validator 'dict' rejected value: 1 nested field(s) failed: 'bad': bad field");
    }

    #[test]
    fn test_dict_requires_parser() {
        let value = Value::Mapping(mapping! { "a" => declaration(1) });
        assert!(!DictValidator.validate(&value, &ValidationContext::new()));
        assert!(DictValidator.parse(&value, &mut ValidationContext::new()).is_err());
    }

    #[test]
    fn test_gridoptions_structure() {
        let mut parser = Recording { calls: Vec::new() };
        let value = Value::Sequence(vec![
            Value::Mapping(mapping! { "alpha" => declaration(1) }),
            Value::Mapping(mapping! { "alpha" => declaration(2), "lw" => declaration(3) }),
        ]);
        let mut ctx = ValidationContext::with_field_parser(&mut parser);
        assert!(GridoptionsValidator.validate(&value, &ctx));
        let parsed = GridoptionsValidator.parse(&value, &mut ctx).unwrap();
        assert_eq!(parsed.as_sequence().unwrap()[1], Value::Mapping(mapping! { "alpha" => 2_i64, "lw" => 3_i64 }));

        let flat = Value::Sequence(vec![Value::Mapping(mapping! { "alpha" => 1_i64 })]);
        assert!(!GridoptionsValidator.validate(&flat, &ctx));
    }

    #[test]
    fn test_plotoptions_single_call() {
        let mut parser = Recording { calls: Vec::new() };
        let value = Value::Mapping(mapping! { "a" => declaration(1), "b" => declaration(2) });
        {
            let mut ctx = ValidationContext::with_field_parser(&mut parser);
            PlotoptionsValidator.parse(&value, &mut ctx).unwrap();
        }
        assert_eq!(parser.calls.len(), 1);
    }

    #[test]
    fn test_fatal_errors_pass_through() {
        struct Deep;
        impl FieldParser for Deep {
            fn parse_fields(&mut self, _fields: &Mapping) -> Result<Mapping> {
                Err(ResolveError::ResolutionTooDeep { max_depth: 1, stack: vec![] })
            }
        }
        let mut parser = Deep;
        let mut ctx = ValidationContext::with_field_parser(&mut parser);
        let value = Value::Mapping(mapping! { "a" => declaration(1) });
        let err = DictValidator.parse(&value, &mut ctx).unwrap_err();
        assert!(err.is_fatal());
    }
}
