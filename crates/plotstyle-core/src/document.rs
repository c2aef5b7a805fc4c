//! Locating and loading style documents.

use crate::diagnostic::{Diagnostic, report};
use crate::error::{ResolveError, Result};
use crate::value::{FieldIntent, Mapping, Value};
use plotstyle_yaml::{YamlNode, YamlValue};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Finds documents by base filename under a root folder.
#[derive(Debug, Clone)]
pub struct DocumentLocator {
    root: PathBuf,
}

impl DocumentLocator {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a document name to a file.
    ///
    /// Absolute paths are used as given. Anything else is reduced to its
    /// base filename and searched for in the root and its subdirectories;
    /// the shallowest match wins, ties going to the lexicographically
    /// smallest path.
    pub fn locate(&self, name: &str) -> Result<PathBuf> {
        let not_found = || ResolveError::DocumentNotFound {
            name: name.to_string(),
            root: self.root.clone(),
        };

        let requested = Path::new(name);
        let path = if requested.is_absolute() {
            if !requested.is_file() {
                return Err(not_found());
            }
            requested.to_path_buf()
        } else {
            let basename = requested.file_name().ok_or_else(not_found)?;
            WalkDir::new(&self.root)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && e.file_name() == basename)
                .map(|e| (e.depth(), e.into_path()))
                .min()
                .map(|(_, path)| path)
                .ok_or_else(not_found)?
        };

        if !has_yaml_extension(&path) {
            return Err(ResolveError::schema(format!("file '{}' is not yaml", path.display())));
        }
        tracing::debug!(?path, document = name, "located document");
        Ok(path)
    }
}

fn has_yaml_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == "yaml" || ext == "yml")
}

/// Read and parse a document file into its top-level mapping.
pub fn load_document(path: &Path, diagnostics: &mut Vec<Diagnostic>) -> Result<Mapping> {
    let content = std::fs::read_to_string(path).map_err(|e| ResolveError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let filename = path.display().to_string();
    let node = plotstyle_yaml::parse_file(&content, &filename).map_err(|source| ResolveError::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    document_mapping(&node, Some(&filename), diagnostics)
}

/// Parse document text into its top-level mapping.
pub fn parse_document(content: &str, diagnostics: &mut Vec<Diagnostic>) -> Result<Mapping> {
    let node = plotstyle_yaml::parse(content).map_err(|source| ResolveError::Yaml {
        path: PathBuf::from("<string>"),
        source,
    })?;
    document_mapping(&node, None, diagnostics)
}

fn document_mapping(node: &YamlNode, file: Option<&str>, diagnostics: &mut Vec<Diagnostic>) -> Result<Mapping> {
    let mut notes = Vec::new();
    let value = value_from_yaml(node, &mut notes);
    for note in notes {
        report(diagnostics, note.in_file(file.map(str::to_string)));
    }
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(entries) => Ok(entries),
        other => Err(ResolveError::schema(format!(
            "top-level YAML must be a mapping, found {}",
            other.type_name()
        ))),
    }
}

/// Convert a parsed node into a [`Value`], turning `!implicit` and
/// `!explicit` tags into [`Value::Tagged`]. Other local tags are reported
/// and dropped.
pub fn value_from_yaml(node: &YamlNode, diagnostics: &mut Vec<Diagnostic>) -> Value {
    let value = match &node.value {
        YamlValue::Null => Value::Null,
        YamlValue::Bool(b) => Value::Bool(*b),
        YamlValue::Integer(i) => Value::Int(*i),
        YamlValue::Real(f) => Value::Float(*f),
        YamlValue::String(s) => Value::String(s.clone()),
        YamlValue::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| value_from_yaml(item, diagnostics))
                .collect(),
        ),
        YamlValue::Mapping(entries) => Value::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), value_from_yaml(v, diagnostics)))
                .collect(),
        ),
    };

    match node.tag.as_deref() {
        None => value,
        Some(tag) => match FieldIntent::from_tag(tag) {
            Some(intent) => Value::tagged(intent, value),
            None => {
                diagnostics.push(Diagnostic::note(format!(
                    "unknown tag '!{}' at {} ignored",
                    tag, node.source_info
                )));
                value
            }
        },
    }
}
