//! Entry points for building styles.

use crate::context::ParseContext;
use crate::descriptor::keys;
use crate::diagnostic::Diagnostic;
use crate::document::{load_document, parse_document};
use crate::error::Result;
use crate::options::{DEFAULT_LANGUAGE, ResolveOptions};
use crate::resolve::{Resolver, Scope, finish};
use crate::style::ResolvedStyle;
use crate::template::StyleTemplate;
use crate::validator::ValidatorRegistry;
use crate::value::{Mapping, Value};

/// What a document resolves to: one style, or a template when the document
/// declares `configs`.
pub enum LoadedStyle<'r> {
    Single(ResolvedStyle),
    Template(StyleTemplate<'r>),
}

impl<'r> LoadedStyle<'r> {
    pub fn into_single(self) -> Option<ResolvedStyle> {
        match self {
            LoadedStyle::Single(style) => Some(style),
            LoadedStyle::Template(_) => None,
        }
    }

    pub fn into_template(self) -> Option<StyleTemplate<'r>> {
        match self {
            LoadedStyle::Single(_) => None,
            LoadedStyle::Template(template) => Some(template),
        }
    }
}

/// Builds [`ResolvedStyle`]s from mappings and documents with one set of
/// options and validators.
pub struct StyleLoader<'r> {
    registry: &'r ValidatorRegistry,
    options: ResolveOptions,
}

impl StyleLoader<'static> {
    /// A loader using the shared standard validators.
    pub fn with_options(options: ResolveOptions) -> Result<Self> {
        StyleLoader::new(ValidatorRegistry::shared(), options)
    }
}

impl<'r> StyleLoader<'r> {
    /// Fails with [`InvalidOptions`](crate::ResolveError::InvalidOptions)
    /// when the folder settings are unusable.
    pub fn new(registry: &'r ValidatorRegistry, options: ResolveOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { registry, options })
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    pub fn registry(&self) -> &'r ValidatorRegistry {
        self.registry
    }

    fn resolver(&self) -> Resolver<'r> {
        Resolver::new(self.registry, &self.options)
    }

    /// Resolve an in-memory document. A `configs` entry is ignored.
    pub fn from_mapping(&self, doc: &Mapping) -> Result<ResolvedStyle> {
        self.resolve_single(Vec::new(), |resolver, ctx| {
            let mut scope = Scope::new();
            resolver.merge_document(doc, &mut scope, None, ctx, 0)?;
            Ok(scope)
        })
    }

    /// Parse and resolve document text.
    pub fn from_text(&self, content: &str) -> Result<ResolvedStyle> {
        let mut diagnostics = Vec::new();
        let doc = parse_document(content, &mut diagnostics)?;
        self.resolve_single(diagnostics, |resolver, ctx| {
            let mut scope = Scope::new();
            resolver.merge_document(&doc, &mut scope, None, ctx, 0)?;
            Ok(scope)
        })
    }

    /// Locate, load and resolve a document.
    ///
    /// A missing or malformed top-level document is an error; problems with
    /// individual fields are reported on the result.
    pub fn from_path(&self, name: &str) -> Result<LoadedStyle<'r>> {
        let resolver = self.resolver();
        let path = resolver.locator().locate(name)?;
        let mut diagnostics = Vec::new();
        let doc = load_document(&path, &mut diagnostics)?;

        if let Some(configs) = doc.get(keys::CONFIGS) {
            let template = StyleTemplate::new(self.registry, self.options.clone(), doc.clone(), configs)?
                .with_origin(path, diagnostics);
            return Ok(LoadedStyle::Template(template));
        }

        self.resolve_single(diagnostics, |resolver, ctx| {
            resolver.merge_files(&[(path, doc)], ctx)
        })
        .map(LoadedStyle::Single)
    }

    /// Resolve several documents into one style; later documents override
    /// earlier ones. `configs` entries are ignored.
    pub fn from_paths<S: AsRef<str>>(&self, names: &[S]) -> Result<ResolvedStyle> {
        let resolver = self.resolver();
        let mut diagnostics = Vec::new();
        let mut docs = Vec::with_capacity(names.len());
        for name in names {
            let path = resolver.locator().locate(name.as_ref())?;
            let doc = load_document(&path, &mut diagnostics)?;
            docs.push((path, doc));
        }
        self.resolve_single(diagnostics, |resolver, ctx| resolver.merge_files(&docs, ctx))
    }

    /// A template from a base document and its overrides.
    pub fn template(&self, base: Mapping, configs: &Value) -> Result<StyleTemplate<'r>> {
        StyleTemplate::new(self.registry, self.options.clone(), base, configs)
    }

    fn resolve_single<F>(&self, diagnostics: Vec<Diagnostic>, merge: F) -> Result<ResolvedStyle>
    where
        F: FnOnce(&Resolver<'r>, &mut ParseContext) -> Result<Scope>,
    {
        let resolver = self.resolver();
        let mut ctx = ParseContext::new();
        ctx.diagnostics = diagnostics;
        let scope = merge(&resolver, &mut ctx)?;

        let language = self
            .options
            .language
            .clone()
            .or_else(|| {
                scope
                    .get(keys::LANGUAGE)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        Ok(finish(scope, ctx, language, self.options.keep_all_fields))
    }
}
