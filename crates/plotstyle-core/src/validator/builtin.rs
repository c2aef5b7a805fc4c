//! Scalar validators.

use super::{ValidationContext, Validator};
use crate::error::{ResolveError, Result};
use crate::value::Value;
use std::path::{Component, Path};

fn rejected(name: &str, value: &Value, expected: &str) -> ResolveError {
    ResolveError::invalid(name, format!("expected {}, got {}", expected, describe(value)))
}

fn describe(value: &Value) -> String {
    match value.untagged() {
        Value::String(s) => format!("string '{}'", s),
        Value::Int(i) => format!("int {}", i),
        Value::Float(f) => format!("float {}", f),
        Value::Bool(b) => format!("bool {}", b),
        other => other.type_name().to_string(),
    }
}

/// Accepts anything; strips intent tags.
pub struct UndeterminedValidator;

impl Validator for UndeterminedValidator {
    fn validate(&self, _value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        true
    }

    fn parse(&self, value: &Value, _ctx: &mut ValidationContext<'_>) -> Result<Value> {
        Ok(value.clone().into_untagged())
    }
}

/// A string, or a mapping of strings (a localization table).
pub struct StrValidator;

impl Validator for StrValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        match value.untagged() {
            Value::String(_) => true,
            Value::Mapping(entries) => entries.values().all(|v| v.as_str().is_some()),
            _ => false,
        }
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("str", value, "a string or a mapping of strings"));
        }
        Ok(value.clone().into_untagged())
    }

    fn fallback(&self) -> Value {
        Value::from("")
    }
}

pub struct BoolValidator;

impl Validator for BoolValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        value.as_bool().is_some()
    }

    fn parse(&self, value: &Value, _ctx: &mut ValidationContext<'_>) -> Result<Value> {
        value
            .as_bool()
            .map(Value::Bool)
            .ok_or_else(|| rejected("bool", value, "a boolean"))
    }

    fn fallback(&self) -> Value {
        Value::Bool(false)
    }
}

/// Integers. Floats are truncated toward zero and strings are parsed;
/// booleans are rejected.
pub struct IntValidator;

impl IntValidator {
    fn convert(value: &Value) -> Option<i64> {
        match value.untagged() {
            Value::Int(i) => Some(*i),
            Value::Float(f) if f.is_finite() && f.abs() < i64::MAX as f64 => Some(f.trunc() as i64),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        }
    }
}

impl Validator for IntValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        Self::convert(value).is_some()
    }

    fn parse(&self, value: &Value, _ctx: &mut ValidationContext<'_>) -> Result<Value> {
        Self::convert(value)
            .map(Value::Int)
            .ok_or_else(|| rejected("int", value, "an integer"))
    }

    fn fallback(&self) -> Value {
        Value::Int(0)
    }
}

/// Real numbers, from numbers or numeric strings; booleans are rejected.
pub struct FloatValidator;

impl FloatValidator {
    fn convert(value: &Value) -> Option<f64> {
        match value.untagged() {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => other.as_f64(),
        }
    }
}

impl Validator for FloatValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        Self::convert(value).is_some()
    }

    fn parse(&self, value: &Value, _ctx: &mut ValidationContext<'_>) -> Result<Value> {
        Self::convert(value)
            .map(Value::Float)
            .ok_or_else(|| rejected("float", value, "a real number"))
    }

    fn fallback(&self) -> Value {
        Value::Float(0.0)
    }
}

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Whether every segment of `path` is usable as a file or folder name on
/// common platforms.
pub(crate) fn is_portable_path(path: &str) -> bool {
    if path.trim().is_empty() {
        return false;
    }
    Path::new(path).components().all(|component| match component {
        Component::Normal(segment) => match segment.to_str() {
            Some(segment) => is_portable_segment(segment),
            None => false,
        },
        _ => true,
    })
}

fn is_portable_segment(segment: &str) -> bool {
    let stem = segment.split('.').next().unwrap_or_default().to_ascii_uppercase();
    if RESERVED_NAMES.contains(&stem.as_str()) {
        return false;
    }
    if segment.contains(INVALID_CHARS) || segment.chars().any(|c| (c as u32) < 32) {
        return false;
    }
    !(segment.ends_with(' ') || segment.ends_with('.'))
}

/// A string usable as a relative or absolute path.
pub struct PathstrValidator;

impl Validator for PathstrValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        value.as_str().is_some_and(is_portable_path)
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("pathstr", value, "a valid path"));
        }
        Ok(value.clone().into_untagged())
    }

    fn fallback(&self) -> Value {
        Value::from("")
    }
}

/// Same rules as `pathstr`, reported as a file name.
pub struct FilenameValidator;

impl Validator for FilenameValidator {
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool {
        PathstrValidator.validate(value, ctx)
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("filename", value, "a valid file name"));
        }
        Ok(value.clone().into_untagged())
    }

    fn fallback(&self) -> Value {
        Value::from("")
    }
}

/// Path to an existing, well-formed YAML file. Chain-include fields use
/// this validator on each located document.
pub struct YamlValidator;

impl Validator for YamlValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        let Some(path) = value.as_str().filter(|p| is_portable_path(p)) else {
            return false;
        };
        let path = Path::new(path);
        if !path.is_file() {
            return false;
        }
        match std::fs::read_to_string(path) {
            Ok(content) => plotstyle_yaml::parse(&content).is_ok(),
            Err(_) => false,
        }
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("yaml", value, "a path to a readable YAML file"));
        }
        let normalized: std::path::PathBuf = Path::new(value.as_str().unwrap_or_default())
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .collect();
        Ok(Value::from(normalized.to_string_lossy().into_owned()))
    }

    fn fallback(&self) -> Value {
        Value::from("")
    }
}

const NAMED_FONT_SIZES: &[&str] = &[
    "xx-small", "x-small", "small", "medium", "large", "x-large", "xx-large",
];

/// A positive size, a named size, or null.
pub struct FontsizeValidator;

impl Validator for FontsizeValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        match value.untagged() {
            Value::Null => true,
            Value::String(s) => NAMED_FONT_SIZES.contains(&s.as_str()),
            other => other.as_f64().is_some_and(|size| size > 0.0),
        }
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("fontsize", value, "a positive number or a named size"));
        }
        Ok(value.clone().into_untagged())
    }
}

/// A non-negative width or null.
pub struct LinewidthValidator;

impl Validator for LinewidthValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        match value.untagged() {
            Value::Null => true,
            other => other.as_f64().is_some_and(|width| width >= 0.0),
        }
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            return Err(rejected("linewidth", value, "a non-negative number"));
        }
        Ok(value.clone().into_untagged())
    }
}

/// Figure dimensions: two positive numbers, given as a sequence or as a
/// `"(width, height)"` string.
pub struct FigsizeValidator;

impl FigsizeValidator {
    fn dimensions(value: &Value) -> Option<(f64, f64)> {
        let (w, h) = match value.untagged() {
            Value::Sequence(items) if items.len() == 2 => (items[0].as_f64()?, items[1].as_f64()?),
            Value::String(s) => {
                let inner = s.trim().strip_prefix('(')?.strip_suffix(')')?;
                let mut parts = inner.split(',').map(str::trim);
                let w = parts.next()?.parse::<f64>().ok()?;
                let h = parts.next()?.parse::<f64>().ok()?;
                if parts.next().is_some() {
                    return None;
                }
                (w, h)
            }
            _ => return None,
        };
        (w > 0.0 && h > 0.0).then_some((w, h))
    }
}

impl Validator for FigsizeValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        Self::dimensions(value).is_some()
    }

    fn parse(&self, value: &Value, _ctx: &mut ValidationContext<'_>) -> Result<Value> {
        let (w, h) = Self::dimensions(value)
            .ok_or_else(|| rejected("figsize", value, "two positive numbers"))?;
        Ok(Value::Sequence(vec![Value::Float(w), Value::Float(h)]))
    }
}

/// One string out of a fixed set. Hosts use this for enumerations the
/// engine does not know about, such as export formats.
pub struct ChoiceValidator {
    choices: Vec<String>,
}

impl ChoiceValidator {
    pub fn new<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            choices: choices.into_iter().map(Into::into).collect(),
        }
    }
}

impl Validator for ChoiceValidator {
    fn validate(&self, value: &Value, _ctx: &ValidationContext<'_>) -> bool {
        value.as_str().is_some_and(|s| self.choices.iter().any(|c| c == s))
    }

    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value> {
        if !self.validate(value, ctx) {
            let expected = format!("one of {}", self.choices.join(", "));
            return Err(rejected("choice", value, &expected));
        }
        Ok(value.clone().into_untagged())
    }
}
