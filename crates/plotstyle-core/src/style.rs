//! The result of a resolution.

use crate::diagnostic::Diagnostic;
use crate::value::{Mapping, Value};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;

/// A fully resolved style: a flat, ordered mapping from field name to
/// value, plus what happened on the way there.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    values: Mapping,
    language: String,
    diagnostics: Vec<Diagnostic>,
    marked_for_delete: BTreeSet<String>,
}

impl ResolvedStyle {
    pub(crate) fn new(
        values: Mapping,
        language: String,
        diagnostics: Vec<Diagnostic>,
        marked_for_delete: BTreeSet<String>,
    ) -> Self {
        Self {
            values,
            language,
            diagnostics,
            marked_for_delete,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(|k| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Mapping {
        &self.values
    }

    pub fn into_values(self) -> Mapping {
        self.values
    }

    /// Language used for localization.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Every recoverable problem met during resolution, in order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Diagnostics for fields or decorations that were dropped.
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter().filter(|d| d.is_warning())
    }

    /// Fields chosen for deletion. They are absent from the values unless
    /// every field was kept.
    pub fn marked_for_delete(&self) -> &BTreeSet<String> {
        &self.marked_for_delete
    }
}

impl Serialize for ResolvedStyle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.values.serialize(serializer)
    }
}
