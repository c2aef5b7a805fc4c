//! Bookkeeping for one resolution.

use crate::affix::AffixRegistry;
use crate::descriptor::{FieldDescriptor, KeepOverride, Source};
use crate::diagnostic::{Diagnostic, report};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// A field read by a nested declaration of a composite value.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NestedReference {
    pub source: Source,
    pub target: String,
}

/// Mutable state of one resolution (or of one template branch).
#[derive(Debug, Clone, Default)]
pub struct ParseContext {
    /// Latest descriptor per declared key, in first-seen order.
    pub(crate) field_props: IndexMap<String, FieldDescriptor>,
    pub(crate) nested_references: Vec<NestedReference>,
    pub(crate) explicitly_kept: BTreeSet<String>,
    pub(crate) explicitly_deleted: BTreeSet<String>,
    pub(crate) marked_for_delete: BTreeSet<String>,
    pub(crate) affixes: AffixRegistry,
    /// Documents currently being merged, outermost first.
    pub(crate) file_stack: Vec<PathBuf>,
    pub(crate) diagnostics: Vec<Diagnostic>,
}

/// Saved resolution state, used to undo a partially applied chain-include.
pub(crate) struct Checkpoint {
    field_props: IndexMap<String, FieldDescriptor>,
    nested_references: Vec<NestedReference>,
    explicitly_kept: BTreeSet<String>,
    explicitly_deleted: BTreeSet<String>,
    affixes: AffixRegistry,
}

impl ParseContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn file_stack(&self) -> &[PathBuf] {
        &self.file_stack
    }

    pub fn marked_for_delete(&self) -> &BTreeSet<String> {
        &self.marked_for_delete
    }

    pub(crate) fn record(&mut self, key: &str, descriptor: FieldDescriptor) {
        self.field_props.insert(key.to_string(), descriptor);
    }

    pub(crate) fn apply_keep(&mut self, key: &str, keep: KeepOverride) {
        match keep {
            KeepOverride::Unset => {}
            KeepOverride::Keep => {
                self.explicitly_deleted.remove(key);
                self.explicitly_kept.insert(key.to_string());
            }
            KeepOverride::Delete => {
                self.explicitly_kept.remove(key);
                self.explicitly_deleted.insert(key.to_string());
            }
        }
    }

    /// Report a skipped field, tagged with the innermost document.
    pub(crate) fn warn(&mut self, key: &str, message: impl Into<String>) {
        let file = self.current_file();
        report(&mut self.diagnostics, Diagnostic::warning(key, message).in_file(file));
    }

    pub(crate) fn current_file(&self) -> Option<String> {
        self.file_stack.last().map(|p| p.display().to_string())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            field_props: self.field_props.clone(),
            nested_references: self.nested_references.clone(),
            explicitly_kept: self.explicitly_kept.clone(),
            explicitly_deleted: self.explicitly_deleted.clone(),
            affixes: self.affixes.clone(),
        }
    }

    /// Roll back to `checkpoint`. Diagnostics are kept.
    pub(crate) fn restore(&mut self, checkpoint: Checkpoint) {
        self.field_props = checkpoint.field_props;
        self.nested_references = checkpoint.nested_references;
        self.explicitly_kept = checkpoint.explicitly_kept;
        self.explicitly_deleted = checkpoint.explicitly_deleted;
        self.affixes = checkpoint.affixes;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_later_keep_wins() {
        let mut ctx = ParseContext::new();
        ctx.apply_keep("a", KeepOverride::Keep);
        ctx.apply_keep("a", KeepOverride::Delete);
        assert!(ctx.explicitly_deleted.contains("a"));
        assert!(!ctx.explicitly_kept.contains("a"));
    }

    #[test]
    fn test_restore_keeps_diagnostics() {
        let mut ctx = ParseContext::new();
        let checkpoint = ctx.checkpoint();
        ctx.record("a", FieldDescriptor::implicit(1_i64.into()));
        ctx.warn("a", "broken");
        ctx.restore(checkpoint);
        assert!(ctx.field_props.is_empty());
        assert_eq!(ctx.diagnostics().len(), 1);
    }
}
