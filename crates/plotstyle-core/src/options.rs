//! Resolver settings.

use crate::error::{ResolveError, Result};
use crate::validator::is_portable_path;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Folder searched for documents when none is configured.
pub const DEFAULT_DOCUMENTS_ROOT: &str = "plotstyle_configs";

/// Language used when neither the options nor the documents choose one.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Maximum nesting of chain-includes and nested declarations.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Settings shared by every resolution made through one loader.
///
/// Can be read from a TOML file:
///
/// ```toml
/// documents-root = "styles"
/// language = "pt"
/// keep-all-fields = false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct ResolveOptions {
    /// Folder searched (recursively) for documents named by base filename
    pub documents_root: PathBuf,

    /// Active language; overrides any `language` field of the documents
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Return every resolved field, skipping deletion of reference targets
    pub keep_all_fields: bool,

    /// Folder for auxiliary file-valued fields; validated, not interpreted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_folder: Option<PathBuf>,

    pub max_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            documents_root: PathBuf::from(DEFAULT_DOCUMENTS_ROOT),
            language: None,
            keep_all_fields: false,
            base_folder: None,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ResolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.documents_root = root.into();
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_keep_all_fields(mut self, keep_all: bool) -> Self {
        self.keep_all_fields = keep_all;
        self
    }

    pub fn with_base_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.base_folder = Some(folder.into());
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Parse options from TOML text. Missing keys take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| ResolveError::InvalidOptions(e.to_string()))
    }

    /// Read options from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ResolveError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Check that folder settings are usable path strings.
    pub fn validate(&self) -> Result<()> {
        check_folder("documents-root", Some(&self.documents_root))?;
        check_folder("base-folder", self.base_folder.as_deref())?;
        if let Some(language) = &self.language {
            if language.trim().is_empty() {
                return Err(ResolveError::InvalidOptions("language must not be empty".into()));
            }
        }
        if self.max_depth == 0 {
            return Err(ResolveError::InvalidOptions("max-depth must be at least 1".into()));
        }
        Ok(())
    }
}

fn check_folder(option: &str, folder: Option<&Path>) -> Result<()> {
    let Some(folder) = folder else {
        return Ok(());
    };
    match folder.to_str() {
        Some(s) if is_portable_path(s) => Ok(()),
        _ => Err(ResolveError::InvalidOptions(format!(
            "{} '{}' is an invalid folder name",
            option,
            folder.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ResolveOptions::default();
        assert_eq!(options.documents_root, PathBuf::from("plotstyle_configs"));
        assert!(!options.keep_all_fields);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let options = ResolveOptions::from_toml_str(
            r#"
documents-root = "styles"
language = "pt"
keep-all-fields = true
"#,
        )
        .unwrap();
        assert_eq!(options.documents_root, PathBuf::from("styles"));
        assert_eq!(options.language.as_deref(), Some("pt"));
        assert!(options.keep_all_fields);
        assert_eq!(options.max_depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = ResolveOptions::from_toml_str("configs-folder = \"x\"").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidOptions(_)));
    }

    #[test]
    fn test_invalid_folders() {
        let err = ResolveOptions::new().with_documents_root("bad|root").validate().unwrap_err();
        insta::assert_snapshot!(err.to_string(), @"invalid options: documents-root 'bad|root' is an invalid folder name");
        assert!(ResolveOptions::new().with_base_folder("out/NUL").validate().is_err());
        assert!(ResolveOptions::new().with_max_depth(0).validate().is_err());
    }
}
