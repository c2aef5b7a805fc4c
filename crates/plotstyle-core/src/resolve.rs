//! The field resolver.
//!
//! Documents are merged one field at a time, in declaration order, into an
//! accumulating scope. A field either resolves to a value (through its
//! validator) or, for chain-include fields, merges other documents into the
//! same scope at that point. A field that fails is reported and left out;
//! only depth-limit errors abort the resolution.

use crate::affix::AffixKind;
use crate::context::{NestedReference, ParseContext};
use crate::descriptor::{CHAIN_INCLUDE_VALIDATOR, FieldDescriptor, keys};
use crate::document::{DocumentLocator, load_document};
use crate::error::{ResolveError, Result};
use crate::keep::infer_deletions;
use crate::localize::localize_mapping;
use crate::options::ResolveOptions;
use crate::style::ResolvedStyle;
use crate::validator::{FieldParser, ValidationContext, ValidatorRegistry};
use crate::value::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Resolved values by key.
pub type Scope = Mapping;

/// A scope and the scopes visible behind it, innermost first.
#[derive(Clone, Copy)]
pub(crate) struct ScopeChain<'a> {
    scope: &'a Scope,
    parent: Option<&'a ScopeChain<'a>>,
}

impl<'a> ScopeChain<'a> {
    pub(crate) fn new(scope: &'a Scope, parent: Option<&'a ScopeChain<'a>>) -> Self {
        Self { scope, parent }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        match self.scope.get(key) {
            Some(value) => Some(value),
            None => self.parent.and_then(|p| p.lookup(key)),
        }
    }
}

/// Split fatal errors from per-field ones.
fn recover(err: ResolveError, on_error: impl FnOnce(ResolveError)) -> Result<()> {
    match err.into_fatal() {
        Ok(fatal) => Err(fatal),
        Err(err) => {
            on_error(err);
            Ok(())
        }
    }
}

pub(crate) struct Resolver<'r> {
    registry: &'r ValidatorRegistry,
    locator: DocumentLocator,
    max_depth: usize,
}

impl<'r> Resolver<'r> {
    pub(crate) fn new(registry: &'r ValidatorRegistry, options: &ResolveOptions) -> Self {
        Self {
            registry,
            locator: DocumentLocator::new(&options.documents_root),
            max_depth: options.max_depth,
        }
    }

    pub(crate) fn locator(&self) -> &DocumentLocator {
        &self.locator
    }

    /// Merge the declarations of `doc` into `scope`.
    ///
    /// References are looked up in `scope` first, then in `read_from`.
    pub(crate) fn merge_document(
        &self,
        doc: &Mapping,
        scope: &mut Scope,
        read_from: Option<&ScopeChain<'_>>,
        ctx: &mut ParseContext,
        depth: usize,
    ) -> Result<()> {
        for (key, raw) in doc {
            if key == keys::CONFIGS {
                continue;
            }

            let descriptor = match FieldDescriptor::normalize(key, raw, &mut ctx.diagnostics) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    ctx.warn(key, err.to_string());
                    continue;
                }
            };
            ctx.record(key, descriptor.clone());

            let outcome = if descriptor.is_chain_include() {
                self.include_documents(key, &descriptor, scope, read_from, ctx, depth)
            } else {
                self.resolve_field(key, &descriptor, scope, read_from, ctx, depth)
            };

            match outcome {
                Ok(()) => ctx.apply_keep(key, descriptor.keep),
                Err(err) => recover(err, |err| ctx.warn(key, err.to_string()))?,
            }
        }
        Ok(())
    }

    fn resolve_field(
        &self,
        key: &str,
        descriptor: &FieldDescriptor,
        scope: &mut Scope,
        read_from: Option<&ScopeChain<'_>>,
        ctx: &mut ParseContext,
        depth: usize,
    ) -> Result<()> {
        let value = {
            let chain = ScopeChain::new(scope, read_from);
            self.parse_descriptor(key, descriptor, &chain, ctx, depth)?
        };
        scope.insert(key.to_string(), value);

        ctx.affixes.clear(key);
        for (kind, affix) in [
            (AffixKind::Prefix, &descriptor.prefix),
            (AffixKind::Suffix, &descriptor.suffix),
        ] {
            let Some(affix) = affix else {
                continue;
            };
            let affix_key = format!("{}.{}", key, kind.as_str());
            let parsed = {
                let chain = ScopeChain::new(scope, read_from);
                self.parse_descriptor(&affix_key, affix, &chain, ctx, depth)
            };
            match parsed {
                Ok(value) => ctx.affixes.insert(key, kind, value),
                Err(err) => recover(err, |err| ctx.warn(&affix_key, err.to_string()))?,
            }
        }
        Ok(())
    }

    /// Fetch a declaration's raw value and run it through its validator.
    fn parse_descriptor(
        &self,
        key: &str,
        descriptor: &FieldDescriptor,
        chain: &ScopeChain<'_>,
        ctx: &mut ParseContext,
        depth: usize,
    ) -> Result<Value> {
        let validator = self.registry.lookup(&descriptor.validator)?;
        let raw = fetch_raw(descriptor, chain)?;

        let mut nested = NestedFields {
            resolver: self,
            parent: chain,
            ctx,
            owner: key,
            depth: depth + 1,
        };
        let mut vctx = ValidationContext::with_field_parser(&mut nested);
        validator.parse(&raw, &mut vctx)
    }

    /// Merge every document named by a chain-include field.
    ///
    /// Either all documents merge or none does: a failure rolls the scope
    /// and context back to their state before the field.
    fn include_documents(
        &self,
        key: &str,
        descriptor: &FieldDescriptor,
        scope: &mut Scope,
        read_from: Option<&ScopeChain<'_>>,
        ctx: &mut ParseContext,
        depth: usize,
    ) -> Result<()> {
        let names = {
            let chain = ScopeChain::new(scope, read_from);
            document_names(&fetch_raw(descriptor, &chain)?)?
        };

        if depth + 1 > self.max_depth {
            return Err(self.too_deep(ctx, key));
        }

        let scope_before = scope.clone();
        let checkpoint = ctx.checkpoint();
        for name in &names {
            if let Err(err) = self.include_one(name, scope, read_from, ctx, depth + 1) {
                if !err.is_fatal() {
                    *scope = scope_before;
                    ctx.restore(checkpoint);
                }
                return Err(err);
            }
        }
        Ok(())
    }

    fn include_one(
        &self,
        name: &str,
        scope: &mut Scope,
        read_from: Option<&ScopeChain<'_>>,
        ctx: &mut ParseContext,
        depth: usize,
    ) -> Result<()> {
        let path = self.locator.locate(name)?;
        let identity = canonical(&path);
        if ctx.file_stack.contains(&identity) {
            return Err(ResolveError::IncludeCycle { path });
        }

        let checker = self.registry.lookup(CHAIN_INCLUDE_VALIDATOR)?;
        checker.parse(
            &Value::from(path.to_string_lossy().into_owned()),
            &mut ValidationContext::new(),
        )?;
        let doc = load_document(&path, &mut ctx.diagnostics)?;

        tracing::debug!(?path, depth, "merging included document");
        ctx.file_stack.push(identity);
        let result = self.merge_document(&doc, scope, read_from, ctx, depth);
        ctx.file_stack.pop();
        result
    }

    fn too_deep(&self, ctx: &ParseContext, key: &str) -> ResolveError {
        let mut stack: Vec<String> = ctx
            .file_stack
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        stack.push(key.to_string());
        ResolveError::ResolutionTooDeep {
            max_depth: self.max_depth,
            stack,
        }
    }

    /// Merge the documents at `paths` (already located), later ones
    /// overriding earlier ones, and return the accumulated scope.
    pub(crate) fn merge_files(&self, docs: &[(PathBuf, Mapping)], ctx: &mut ParseContext) -> Result<Scope> {
        let mut scope = Scope::new();
        for (path, doc) in docs {
            ctx.file_stack.push(canonical(path));
            let result = self.merge_document(doc, &mut scope, None, ctx, 0);
            ctx.file_stack.pop();
            result?;
        }
        Ok(scope)
    }
}

/// Identity of a document on the file stack.
pub(crate) fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn fetch_raw(descriptor: &FieldDescriptor, chain: &ScopeChain<'_>) -> Result<Value> {
    match descriptor.reference() {
        None => Ok(descriptor.value.clone()),
        Some(target) => chain
            .lookup(target)
            .cloned()
            .ok_or_else(|| ResolveError::MissingReference {
                target: target.to_string(),
            }),
    }
}

fn document_names(value: &Value) -> Result<Vec<String>> {
    let invalid = || ResolveError::schema("chain-include value must be a path or a list of paths");
    match value.untagged() {
        Value::String(name) => Ok(vec![name.clone()]),
        Value::Sequence(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

/// Field parser handed to composite validators.
///
/// Nested declarations resolve into a fresh scope that can read the scopes
/// around it. They cannot chain-include documents, and prefix/suffix
/// decorations on them are ignored.
struct NestedFields<'a, 'r> {
    resolver: &'a Resolver<'r>,
    parent: &'a ScopeChain<'a>,
    ctx: &'a mut ParseContext,
    owner: &'a str,
    depth: usize,
}

impl FieldParser for NestedFields<'_, '_> {
    fn parse_fields(&mut self, fields: &Mapping) -> Result<Mapping> {
        if self.depth > self.resolver.max_depth {
            return Err(self.resolver.too_deep(self.ctx, self.owner));
        }

        let mut local = Scope::new();
        let mut failures = Vec::new();
        for (key, raw) in fields {
            if key == keys::CONFIGS {
                continue;
            }
            let label = format!("{}.{}", self.owner, key);

            let descriptor = match FieldDescriptor::normalize(&label, raw, &mut self.ctx.diagnostics) {
                Ok(descriptor) => descriptor,
                Err(err) => {
                    failures.push((key.clone(), err));
                    continue;
                }
            };
            if descriptor.is_chain_include() {
                failures.push((
                    key.clone(),
                    ResolveError::schema("chain-includes are only allowed at document level"),
                ));
                continue;
            }
            if descriptor.prefix.is_some() || descriptor.suffix.is_some() {
                self.ctx
                    .warn(&label, "prefix/suffix are only applied to top-level fields; ignored");
            }
            if let Some(target) = descriptor.reference() {
                if !local.contains_key(target) && self.parent.lookup(target).is_some() {
                    self.ctx.nested_references.push(NestedReference {
                        source: descriptor.source,
                        target: target.to_string(),
                    });
                }
            }

            let parsed = {
                let chain = ScopeChain::new(&local, Some(self.parent));
                self.resolver
                    .parse_descriptor(&label, &descriptor, &chain, self.ctx, self.depth)
            };
            match parsed {
                Ok(value) => {
                    local.insert(key.clone(), value);
                }
                Err(err) => match err.into_fatal() {
                    Ok(fatal) => return Err(fatal),
                    Err(err) => failures.push((key.clone(), err)),
                },
            }
        }

        if failures.is_empty() {
            Ok(local)
        } else {
            Err(ResolveError::NestedFields { failures })
        }
    }
}

/// Turn a merged scope into the final style: infer deletions, localize,
/// decorate, and drop deleted fields unless every field is kept.
pub(crate) fn finish(scope: Scope, mut ctx: ParseContext, language: String, keep_all_fields: bool) -> ResolvedStyle {
    ctx.marked_for_delete = infer_deletions(&ctx);

    let mut values = localize_mapping(scope, &language);
    ctx.affixes.localize(&language);
    ctx.affixes.apply(&mut values, &mut ctx.diagnostics);

    if !keep_all_fields {
        values.retain(|key, _| !ctx.marked_for_delete.contains(key));
    }

    ResolvedStyle::new(values, language, ctx.diagnostics, ctx.marked_for_delete)
}
