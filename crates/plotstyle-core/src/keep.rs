//! Deciding which reference-only fields are dropped.

use crate::context::ParseContext;
use crate::descriptor::{FieldDescriptor, Source};
use std::collections::BTreeSet;

/// Fields to drop from the final result.
///
/// A field read by another declaration through `source: field` is a
/// dependency target. Whether a target is kept by default depends on the
/// source of the declaration that reads it; targets never declared
/// themselves are dropped. Explicit `keep` settings override inference.
pub fn infer_deletions(ctx: &ParseContext) -> BTreeSet<String> {
    let mut marked = BTreeSet::new();

    for (source, target) in dependency_targets(ctx) {
        let keep = match ctx.field_props.get(target) {
            None => false,
            Some(_) => source.keeps_reference_targets(),
        };
        if !keep {
            tracing::debug!(key = target, "marking reference target for deletion");
            marked.insert(target.to_string());
        }
    }

    marked.extend(ctx.explicitly_deleted.iter().cloned());
    marked.retain(|key| !ctx.explicitly_kept.contains(key));
    marked
}

/// `(source of the referencing declaration, referenced key)` pairs.
fn dependency_targets(ctx: &ParseContext) -> Vec<(Source, &str)> {
    let mut targets = Vec::new();
    for (key, descriptor) in &ctx.field_props {
        collect(key, descriptor, &mut targets);
        for affix in [&descriptor.prefix, &descriptor.suffix].into_iter().flatten() {
            collect(key, affix, &mut targets);
        }
    }
    targets.extend(
        ctx.nested_references
            .iter()
            .map(|r| (r.source, r.target.as_str())),
    );
    targets
}

fn collect<'a>(key: &str, descriptor: &'a FieldDescriptor, targets: &mut Vec<(Source, &'a str)>) {
    if let Some(target) = descriptor.reference() {
        // A field that reads its own earlier value is not transient.
        if target != key {
            targets.push((descriptor.source, target));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::KeepOverride;
    use crate::mapping;
    use crate::value::Value;

    fn declare(ctx: &mut ParseContext, key: &str, raw: Value) {
        let descriptor = FieldDescriptor::normalize(key, &raw, &mut Vec::new()).unwrap();
        let keep = descriptor.keep;
        ctx.record(key, descriptor);
        ctx.apply_keep(key, keep);
    }

    #[test]
    fn test_reference_target_is_deleted() {
        let mut ctx = ParseContext::new();
        declare(&mut ctx, "base", Value::Mapping(mapping! { "value" => 10_i64, "validator" => "int" }));
        declare(&mut ctx, "doubled", Value::Mapping(mapping! { "value" => "base", "source" => "field" }));
        assert_eq!(infer_deletions(&ctx), BTreeSet::from(["base".to_string()]));
    }

    #[test]
    fn test_explicit_keep_wins() {
        let mut ctx = ParseContext::new();
        declare(&mut ctx, "base", Value::Mapping(mapping! { "value" => 10_i64, "keep" => true }));
        declare(&mut ctx, "doubled", Value::Mapping(mapping! { "value" => "base", "source" => "field" }));
        assert!(infer_deletions(&ctx).is_empty());
    }

    #[test]
    fn test_explicit_delete_without_reference() {
        let mut ctx = ParseContext::new();
        declare(&mut ctx, "scratch", Value::Mapping(mapping! { "value" => 1_i64, "keep" => false }));
        assert_eq!(infer_deletions(&ctx), BTreeSet::from(["scratch".to_string()]));
        assert_eq!(ctx.field_props["scratch"].keep, KeepOverride::Delete);
    }

    #[test]
    fn test_affix_references_count() {
        let mut ctx = ParseContext::new();
        declare(&mut ctx, "version", Value::from("_v2"));
        declare(
            &mut ctx,
            "name",
            Value::Mapping(mapping! {
                "value" => "Report",
                "suffix" => Value::Mapping(mapping! { "value" => "version", "source" => "field" }),
            }),
        );
        assert!(infer_deletions(&ctx).contains("version"));
    }

    #[test]
    fn test_self_reference_not_marked() {
        let mut ctx = ParseContext::new();
        declare(&mut ctx, "title", Value::Mapping(mapping! { "value" => "title", "source" => "field" }));
        assert!(infer_deletions(&ctx).is_empty());
    }
}
