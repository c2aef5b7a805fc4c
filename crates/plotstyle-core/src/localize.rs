//! Per-language value selection.

use crate::value::{Mapping, Value};

/// Replace every localization table in `value` by its entry for
/// `language`.
///
/// A mapping with a `language` key is a localization table and collapses to
/// that entry (itself localized). Any other mapping keeps its keys and has
/// each value localized; sequences are localized element-wise.
pub fn localize(value: Value, language: &str) -> Value {
    match value {
        Value::Mapping(mut entries) => match entries.swap_remove(language) {
            Some(selected) => localize(selected, language),
            None => Value::Mapping(localize_mapping(entries, language)),
        },
        Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(|v| localize(v, language)).collect())
        }
        Value::Tagged(tagged) => localize(tagged.value, language),
        other => other,
    }
}

pub fn localize_mapping(entries: Mapping, language: &str) -> Mapping {
    entries
        .into_iter()
        .map(|(k, v)| (k, localize(v, language)))
        .collect()
}
