//! Named value validators.
//!
//! A [`ValidatorRegistry`] maps validator ids (the `validator` entry of a
//! field declaration) to [`Validator`] implementations. Registries are built
//! once and then only read, so a single registry can serve resolutions on
//! any number of threads.

mod builtin;
mod composite;

pub use builtin::{
    BoolValidator, ChoiceValidator, FigsizeValidator, FilenameValidator, FloatValidator,
    FontsizeValidator, IntValidator, LinewidthValidator, PathstrValidator, StrValidator,
    UndeterminedValidator, YamlValidator,
};
pub use composite::{DictValidator, GridoptionsValidator, PlotoptionsValidator};

pub(crate) use builtin::is_portable_path;

use crate::error::{ResolveError, Result};
use crate::value::{Mapping, Value};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

/// Callback through which composite validators resolve nested field
/// declarations without knowing how resolution works.
pub trait FieldParser {
    /// Resolve `fields` as a group of declarations and return their values.
    ///
    /// Fails if any declaration fails; the error lists every failure.
    fn parse_fields(&mut self, fields: &Mapping) -> Result<Mapping>;
}

/// State handed to a validator for one call.
#[derive(Default)]
pub struct ValidationContext<'a> {
    field_parser: Option<&'a mut dyn FieldParser>,
}

impl<'a> ValidationContext<'a> {
    pub fn new() -> Self {
        Self { field_parser: None }
    }

    pub fn with_field_parser(field_parser: &'a mut dyn FieldParser) -> Self {
        Self {
            field_parser: Some(field_parser),
        }
    }

    pub fn has_field_parser(&self) -> bool {
        self.field_parser.is_some()
    }

    pub fn field_parser(&mut self) -> Option<&mut (dyn FieldParser + 'a)> {
        self.field_parser.as_deref_mut()
    }
}

/// A named capability that checks and converts raw values.
pub trait Validator: Send + Sync {
    /// Whether `parse` would accept `value`. Never fails and has no side
    /// effects; composite validators only check structure here.
    fn validate(&self, value: &Value, ctx: &ValidationContext<'_>) -> bool;

    /// Convert `value`, failing with [`ResolveError::InvalidValue`] when it
    /// is not acceptable. The result never contains intent tags.
    fn parse(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Result<Value>;

    /// Like `parse`, but falls back to a safe default instead of failing.
    fn sanitize(&self, value: &Value, ctx: &mut ValidationContext<'_>) -> Value {
        if self.validate(value, ctx) {
            if let Ok(parsed) = self.parse(value, ctx) {
                return parsed;
            }
        }
        self.fallback()
    }

    /// Value returned by `sanitize` for unacceptable input.
    fn fallback(&self) -> Value {
        Value::Null
    }
}

static SHARED: Lazy<ValidatorRegistry> = Lazy::new(ValidatorRegistry::standard);

/// Table of validators addressed by id.
pub struct ValidatorRegistry {
    validators: IndexMap<String, Box<dyn Validator>>,
}

impl ValidatorRegistry {
    /// A registry with no validators at all.
    pub fn empty() -> Self {
        Self {
            validators: IndexMap::new(),
        }
    }

    /// A registry with every built-in validator.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        registry
            .register("undetermined", UndeterminedValidator)
            .register("str", StrValidator)
            .register("bool", BoolValidator)
            .register("int", IntValidator)
            .register("float", FloatValidator)
            .register("pathstr", PathstrValidator)
            .register("filename", FilenameValidator)
            .register("yaml", YamlValidator)
            .register("fontsize", FontsizeValidator)
            .register("linewidth", LinewidthValidator)
            .register("figsize", FigsizeValidator)
            .register("dict", DictValidator)
            .register("gridoptions", GridoptionsValidator)
            .register("plotoptions", PlotoptionsValidator);
        registry
    }

    /// Process-wide standard registry, built on first use.
    pub fn shared() -> &'static ValidatorRegistry {
        &SHARED
    }

    /// Add or replace a validator.
    pub fn register(&mut self, name: impl Into<String>, validator: impl Validator + 'static) -> &mut Self {
        self.validators.insert(name.into(), Box::new(validator));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Validator> {
        self.validators.get(name).map(|v| v.as_ref())
    }

    pub fn lookup(&self, name: &str) -> Result<&dyn Validator> {
        self.get(name).ok_or_else(|| ResolveError::UnknownValidator {
            validator: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.validators.contains_key(name)
    }

    /// Registered ids, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(|k| k.as_str())
    }
}

impl Default for ValidatorRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
