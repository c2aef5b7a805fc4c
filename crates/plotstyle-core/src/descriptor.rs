//! Canonical form of a declared field.

use crate::diagnostic::{Diagnostic, report};
use crate::error::{ResolveError, Result};
use crate::value::{FieldIntent, Mapping, Value};

/// Reserved keys of the descriptor mapping and of documents.
pub mod keys {
    pub const VALUE: &str = "value";
    pub const VALIDATOR: &str = "validator";
    pub const SOURCE: &str = "source";
    pub const KEEP: &str = "keep";
    pub const PREFIX: &str = "prefix";
    pub const SUFFIX: &str = "suffix";

    /// Template overrides; never resolved as a field.
    pub const CONFIGS: &str = "configs";
    /// Active localization code.
    pub const LANGUAGE: &str = "language";

    pub const SOURCE_LITERAL: &str = "literal";
    pub const SOURCE_FIELD: &str = "field";
}

/// Validator id that turns a field into a chain-include.
pub const CHAIN_INCLUDE_VALIDATOR: &str = "yaml";

/// Validator id used when a declaration names none.
pub const DEFAULT_VALIDATOR: &str = "undetermined";

/// Where a field's raw value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// The declared `value` itself
    Literal,
    /// The resolved value of the field named by `value`
    Field,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Literal => keys::SOURCE_LITERAL,
            Source::Field => keys::SOURCE_FIELD,
        }
    }

    /// Whether a field referenced by a declaration of this source survives
    /// into the final result when nothing says otherwise.
    pub fn keeps_reference_targets(self) -> bool {
        match self {
            Source::Literal => true,
            Source::Field => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeepOverride {
    #[default]
    Unset,
    Keep,
    Delete,
}

/// A field declaration after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Raw payload: the literal value, or the referenced key for
    /// [`Source::Field`].
    pub value: Value,
    pub validator: String,
    pub source: Source,
    pub keep: KeepOverride,
    pub prefix: Option<Box<FieldDescriptor>>,
    pub suffix: Option<Box<FieldDescriptor>>,
}

impl FieldDescriptor {
    /// An implicit declaration: the payload is the value.
    pub fn implicit(value: Value) -> Self {
        Self {
            value,
            validator: DEFAULT_VALIDATOR.to_string(),
            source: Source::Literal,
            keep: KeepOverride::Unset,
            prefix: None,
            suffix: None,
        }
    }

    /// Normalize a raw entry declared under `key`.
    ///
    /// Malformed `keep` values and unusable prefix/suffix decorations are
    /// reported to `diagnostics` and dropped. A descriptor that cannot be
    /// built at all is an error for this field only.
    pub fn normalize(key: &str, raw: &Value, diagnostics: &mut Vec<Diagnostic>) -> Result<Self> {
        if let Value::Tagged(tagged) = raw {
            return match tagged.intent {
                FieldIntent::Implicit => Ok(Self::implicit(tagged.value.clone())),
                FieldIntent::Explicit => match tagged.value.as_mapping() {
                    Some(entries) if entries.contains_key(keys::VALUE) => {
                        Self::from_canonical(key, entries, diagnostics)
                    }
                    _ => Err(ResolveError::schema(format!(
                        "field '{}' tagged !explicit but missing payload key '{}'",
                        key,
                        keys::VALUE
                    ))),
                },
            };
        }

        if let Value::Mapping(entries) = raw {
            if entries.contains_key(keys::VALUE) {
                return Self::from_canonical(key, entries, diagnostics);
            }
            if entries.contains_key(keys::SOURCE) {
                report(
                    diagnostics,
                    Diagnostic::info(
                        key,
                        format!(
                            "contains key '{}' but no '{}' entry; interpreted as implicit field",
                            keys::SOURCE,
                            keys::VALUE
                        ),
                    ),
                );
            }
        }

        Ok(Self::implicit(raw.clone()))
    }

    fn from_canonical(key: &str, entries: &Mapping, diagnostics: &mut Vec<Diagnostic>) -> Result<Self> {
        let value = entries.get(keys::VALUE).cloned().unwrap_or_default();

        let validator = match entries.get(keys::VALIDATOR) {
            None => DEFAULT_VALIDATOR.to_string(),
            Some(v) => v
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ResolveError::schema(format!("validator of field '{}' must be a string", key)))?,
        };

        let source = match entries.get(keys::SOURCE) {
            None => Source::Literal,
            Some(v) => match v.as_str() {
                Some(keys::SOURCE_LITERAL) => Source::Literal,
                Some(keys::SOURCE_FIELD) => Source::Field,
                _ => {
                    return Err(ResolveError::schema(format!(
                        "source of field '{}' must be '{}' or '{}'",
                        key,
                        keys::SOURCE_LITERAL,
                        keys::SOURCE_FIELD
                    )));
                }
            },
        };

        if source == Source::Field && value.as_str().is_none() {
            return Err(ResolveError::schema(format!(
                "field '{}' takes its value from another field, so '{}' must be a field name",
                key,
                keys::VALUE
            )));
        }

        let keep = match entries.get(keys::KEEP) {
            None => KeepOverride::Unset,
            Some(v) => match v.as_bool() {
                Some(true) => KeepOverride::Keep,
                Some(false) => KeepOverride::Delete,
                None => {
                    report(
                        diagnostics,
                        Diagnostic::info(key, format!("'{}' must be a boolean; ignored", keys::KEEP)),
                    );
                    KeepOverride::Unset
                }
            },
        };

        Ok(Self {
            value,
            validator,
            source,
            keep,
            prefix: normalize_affix(key, keys::PREFIX, entries, diagnostics),
            suffix: normalize_affix(key, keys::SUFFIX, entries, diagnostics),
        })
    }

    pub fn is_chain_include(&self) -> bool {
        self.validator == CHAIN_INCLUDE_VALIDATOR
    }

    /// Key this field reads from, for [`Source::Field`] declarations.
    pub fn reference(&self) -> Option<&str> {
        match self.source {
            Source::Field => self.value.as_str(),
            Source::Literal => None,
        }
    }
}

/// The literal value a raw declaration stands for, if it has one.
///
/// Field-sourced and chain-include declarations have none. Nothing is
/// validated or reported.
pub(crate) fn literal_payload(raw: &Value) -> Option<Value> {
    let canonical = |entries: &Mapping| {
        let literal = entries
            .get(keys::SOURCE)
            .is_none_or(|s| s.as_str() == Some(keys::SOURCE_LITERAL));
        let chain = entries
            .get(keys::VALIDATOR)
            .is_some_and(|v| v.as_str() == Some(CHAIN_INCLUDE_VALIDATOR));
        (literal && !chain)
            .then(|| entries.get(keys::VALUE).cloned().unwrap_or_default().into_untagged())
    };
    match raw {
        Value::Tagged(tagged) => match tagged.intent {
            FieldIntent::Implicit => Some(tagged.value.clone().into_untagged()),
            FieldIntent::Explicit => tagged
                .value
                .as_mapping()
                .filter(|m| m.contains_key(keys::VALUE))
                .and_then(canonical),
        },
        Value::Mapping(entries) if entries.contains_key(keys::VALUE) => canonical(entries),
        other => Some(other.clone().into_untagged()),
    }
}

/// Whether a raw declaration is a chain-include. Nothing is reported.
pub(crate) fn declares_chain_include(raw: &Value) -> bool {
    let entries = match raw {
        Value::Tagged(tagged) if tagged.intent == FieldIntent::Explicit => tagged.value.as_mapping(),
        Value::Mapping(entries) => Some(entries),
        _ => None,
    };
    entries.is_some_and(|entries| {
        entries.contains_key(keys::VALUE)
            && entries
                .get(keys::VALIDATOR)
                .is_some_and(|v| v.as_str() == Some(CHAIN_INCLUDE_VALIDATOR))
    })
}

fn normalize_affix(
    key: &str,
    affix: &str,
    entries: &Mapping,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<Box<FieldDescriptor>> {
    let raw = entries.get(affix)?;
    let empty = match raw.untagged() {
        Value::Null => true,
        Value::Mapping(m) => m.is_empty(),
        _ => false,
    };
    if empty {
        return None;
    }

    let affix_key = format!("{}.{}", key, affix);
    match FieldDescriptor::normalize(&affix_key, raw, diagnostics) {
        Ok(descriptor) => Some(Box::new(descriptor)),
        Err(err) => {
            report(diagnostics, Diagnostic::warning(affix_key, err.to_string()));
            None
        }
    }
}
