//! Several styles sharing one base document.

use crate::context::ParseContext;
use crate::descriptor::{declares_chain_include, keys, literal_payload};
use crate::diagnostic::Diagnostic;
use crate::error::{ResolveError, Result};
use crate::options::{DEFAULT_LANGUAGE, ResolveOptions};
use crate::resolve::{Resolver, Scope, ScopeChain, canonical, finish};
use crate::style::ResolvedStyle;
use crate::validator::ValidatorRegistry;
use crate::value::{Mapping, Value};
use std::path::PathBuf;

/// A base document with a list of overrides (the `configs` entry), each
/// producing its own [`ResolvedStyle`].
///
/// Fields declared by the base always win over the same field computed
/// from an override; chain-includes of the override still run. Each branch
/// is resolved only when asked for. The active language is the resolved
/// `language` field, then the loader's language option, then `en`.
pub struct StyleTemplate<'r> {
    registry: &'r ValidatorRegistry,
    options: ResolveOptions,
    base: Mapping,
    overrides: Vec<Mapping>,
    origin: Option<PathBuf>,
    load_diagnostics: Vec<Diagnostic>,
}

impl<'r> StyleTemplate<'r> {
    /// `configs` must be a mapping or a sequence of mappings. A `configs`
    /// entry in `base` is ignored.
    pub(crate) fn new(
        registry: &'r ValidatorRegistry,
        options: ResolveOptions,
        base: Mapping,
        configs: &Value,
    ) -> Result<Self> {
        let invalid = || ResolveError::schema("'configs' must either be a list of mappings or a mapping");
        let overrides = match configs.untagged() {
            Value::Mapping(entries) => vec![entries.clone()],
            Value::Sequence(items) => items
                .iter()
                .map(|item| item.as_mapping().cloned().ok_or_else(invalid))
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(invalid()),
        };

        let mut base = base;
        base.shift_remove(keys::CONFIGS);
        Ok(Self {
            registry,
            options,
            base,
            overrides,
            origin: None,
            load_diagnostics: Vec::new(),
        })
    }

    pub(crate) fn with_origin(mut self, origin: PathBuf, diagnostics: Vec<Diagnostic>) -> Self {
        self.origin = Some(origin);
        self.load_diagnostics = diagnostics;
        self
    }

    pub fn len(&self) -> usize {
        self.overrides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overrides.is_empty()
    }

    pub fn base(&self) -> &Mapping {
        &self.base
    }

    pub fn overrides(&self) -> &[Mapping] {
        &self.overrides
    }

    /// Resolve the branch for override `index`.
    pub fn resolve(&self, index: usize) -> Result<ResolvedStyle> {
        let override_doc = self.overrides.get(index).ok_or_else(|| {
            ResolveError::schema(format!(
                "template has {} override(s); no override at index {}",
                self.len(),
                index
            ))
        })?;

        let resolver = Resolver::new(self.registry, &self.options);
        let mut ctx = ParseContext::new();
        ctx.diagnostics = self.load_diagnostics.clone();
        if let Some(origin) = &self.origin {
            ctx.file_stack.push(canonical(origin));
        }

        // Override entries may read base literals. Entries the base
        // declares itself are never resolved, unless they chain-include.
        let base_literals = self.base_literals();
        let visible = ScopeChain::new(&base_literals, None);
        let own: Mapping = override_doc
            .iter()
            .filter(|(key, raw)| !self.base.contains_key(key.as_str()) || declares_chain_include(raw))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let mut scope = Scope::new();
        resolver.merge_document(&own, &mut scope, Some(&visible), &mut ctx, 0)?;
        resolver.merge_document(&self.base, &mut scope, None, &mut ctx, 0)?;
        ctx.file_stack.clear();

        let language = scope
            .get(keys::LANGUAGE)
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| self.options.language.clone())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        tracing::debug!(index, %language, "expanded template branch");
        Ok(finish(scope, ctx, language, self.options.keep_all_fields))
    }

    /// Lazily resolve every branch, in override order.
    pub fn expand(&self) -> Expansion<'_, 'r> {
        Expansion {
            template: self,
            next: 0,
        }
    }

    fn base_literals(&self) -> Scope {
        self.base
            .iter()
            .filter_map(|(key, raw)| literal_payload(raw).map(|value| (key.clone(), value)))
            .collect()
    }
}

/// Iterator over the branches of a [`StyleTemplate`].
pub struct Expansion<'t, 'r> {
    template: &'t StyleTemplate<'r>,
    next: usize,
}

impl Iterator for Expansion<'_, '_> {
    type Item = Result<ResolvedStyle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.template.len() {
            return None;
        }
        let index = self.next;
        self.next += 1;
        Some(self.template.resolve(index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.template.len().saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Expansion<'_, '_> {}
