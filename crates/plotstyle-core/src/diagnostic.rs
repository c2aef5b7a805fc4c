//! Recoverable problems reported alongside a resolved style.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticKind {
    /// A field or decoration was dropped
    Warning,
    /// Input was accepted but is probably not what the author meant, such
    /// as a mapping with `source` but no `value`. The field is kept, so this
    /// is not a warning.
    Info,
}

/// One recoverable problem, usually naming the field that was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,

    /// Field the problem belongs to (`title`, `title.suffix`, ...)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    pub message: String,

    /// Innermost document being processed when the problem occurred
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

impl Diagnostic {
    pub fn warning(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Warning,
            key: Some(key.into()),
            message: message.into(),
            file: None,
        }
    }

    pub fn info(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Info,
            key: Some(key.into()),
            message: message.into(),
            file: None,
        }
    }

    /// An informational message not tied to a field.
    pub fn note(message: impl Into<String>) -> Self {
        Self {
            kind: DiagnosticKind::Info,
            key: None,
            message: message.into(),
            file: None,
        }
    }

    pub fn in_file(mut self, file: Option<String>) -> Self {
        self.file = file;
        self
    }

    pub fn is_warning(&self) -> bool {
        self.kind == DiagnosticKind::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.key, self.kind) {
            (Some(key), DiagnosticKind::Warning) => {
                write!(f, "field '{}' was ignored: {}", key, self.message)?
            }
            (Some(key), DiagnosticKind::Info) => write!(f, "field '{}': {}", key, self.message)?,
            (None, _) => write!(f, "{}", self.message)?,
        }
        if let Some(file) = &self.file {
            write!(f, " (in {})", file)?;
        }
        Ok(())
    }
}

/// Log a diagnostic and keep it for the caller.
pub(crate) fn report(diagnostics: &mut Vec<Diagnostic>, diagnostic: Diagnostic) {
    tracing::warn!("{}", diagnostic);
    diagnostics.push(diagnostic);
}
