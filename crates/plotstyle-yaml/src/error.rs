//! Error types for YAML parsing with source locations.

use crate::SourceInfo;
use thiserror::Error;

/// Result type alias for plotstyle-yaml operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during YAML parsing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// YAML syntax error reported by the scanner
    #[error("Parse error: {message}")]
    ParseError {
        message: String,
        location: Option<SourceInfo>,
    },

    /// Syntactically valid YAML that cannot be represented as a document tree
    #[error("Invalid YAML structure: {message}{}", display_location(.location))]
    InvalidStructure {
        message: String,
        location: Option<SourceInfo>,
    },
}

impl Error {
    /// Source location of the error, when known.
    pub fn location(&self) -> Option<&SourceInfo> {
        match self {
            Error::ParseError { location, .. } | Error::InvalidStructure { location, .. } => {
                location.as_ref()
            }
        }
    }
}

fn display_location(location: &Option<SourceInfo>) -> String {
    match location {
        Some(loc) => format!(" (at {})", loc),
        None => String::new(),
    }
}

impl From<yaml_rust2::ScanError> for Error {
    fn from(err: yaml_rust2::ScanError) -> Self {
        let marker = err.marker();
        Error::ParseError {
            message: err.info().to_string(),
            location: Some(SourceInfo::from_marker(marker, 0)),
        }
    }
}
