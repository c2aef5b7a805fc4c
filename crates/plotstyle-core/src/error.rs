//! Error types for field resolution.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for plotstyle-core operations.
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Errors raised while resolving a style.
///
/// Most variants describe a failure of a single field and are recovered
/// from by skipping that field. [`ResolveError::is_fatal`] marks the ones
/// that abort the whole resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// A document name could not be located under the documents root.
    #[error("YAML file '{name}' not found in '{}' or its subdirectories", root.display())]
    DocumentNotFound { name: String, root: PathBuf },

    /// A document or field does not have the expected shape.
    #[error("{message}")]
    Schema { message: String },

    /// A field names a validator that is not registered.
    #[error("unknown validator '{validator}'")]
    UnknownValidator { validator: String },

    /// A validator rejected a value.
    #[error("validator '{validator}' rejected value: {message}")]
    InvalidValue { validator: String, message: String },

    /// A field-sourced value points at a key that does not exist.
    #[error("referenced field '{target}' is not defined")]
    MissingReference { target: String },

    /// Chain-includes or nested declarations went deeper than allowed.
    #[error("resolution nested deeper than {max_depth} levels (at {})", stack.join(" -> "))]
    ResolutionTooDeep { max_depth: usize, stack: Vec<String> },

    /// A prefix or suffix cannot be concatenated with the field value.
    #[error("cannot apply {kind} of type {affix_type} to value of type {value_type}")]
    AffixTypeMismatch {
        kind: &'static str,
        value_type: &'static str,
        affix_type: &'static str,
    },

    /// A document includes itself, directly or through other documents.
    #[error("'{}' is already being included", path.display())]
    IncludeCycle { path: PathBuf },

    /// Nested declarations of a composite value failed.
    #[error("{} nested field(s) failed: {}", failures.len(), describe_failures(failures))]
    NestedFields { failures: Vec<(String, ResolveError)> },

    #[error("cannot read '{}': {message}", path.display())]
    Io { path: PathBuf, message: String },

    #[error("invalid YAML in '{}': {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: plotstyle_yaml::Error,
    },

    /// Resolver options are unusable.
    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl ResolveError {
    /// Fatal errors abort the resolution instead of skipping one field.
    pub fn is_fatal(&self) -> bool {
        match self {
            ResolveError::ResolutionTooDeep { .. } => true,
            ResolveError::NestedFields { failures } => failures.iter().any(|(_, e)| e.is_fatal()),
            _ => false,
        }
    }

    /// Pull the first fatal error out of an aggregate, if there is one.
    pub(crate) fn into_fatal(self) -> std::result::Result<ResolveError, ResolveError> {
        match self {
            ResolveError::NestedFields { failures } => {
                let mut failures = failures;
                match failures.iter().position(|(_, e)| e.is_fatal()) {
                    Some(index) => failures.swap_remove(index).1.into_fatal(),
                    None => Err(ResolveError::NestedFields { failures }),
                }
            }
            err if err.is_fatal() => Ok(err),
            err => Err(err),
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        ResolveError::Schema {
            message: message.into(),
        }
    }

    pub(crate) fn invalid(validator: &str, message: impl Into<String>) -> Self {
        ResolveError::InvalidValue {
            validator: validator.to_string(),
            message: message.into(),
        }
    }
}

fn describe_failures(failures: &[(String, ResolveError)]) -> String {
    failures
        .iter()
        .map(|(key, err)| format!("'{}': {}", key, err))
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_depth_errors_are_fatal() {
        let deep = ResolveError::ResolutionTooDeep {
            max_depth: 2,
            stack: vec!["a.yaml".into(), "b.yaml".into()],
        };
        assert!(deep.is_fatal());
        assert!(!ResolveError::schema("bad").is_fatal());

        let nested = ResolveError::NestedFields {
            failures: vec![("x".into(), deep)],
        };
        assert!(nested.is_fatal());
        assert!(matches!(
            nested.into_fatal(),
            Ok(ResolveError::ResolutionTooDeep { .. })
        ));
    }

    #[test]
    fn test_messages() {
        insta::assert_snapshot!(
            ResolveError::MissingReference { target: "base".into() }.to_string(),
            @"referenced field 'base' is not defined"
        );
        let nested = ResolveError::NestedFields {
            failures: vec![
                ("width".into(), ResolveError::invalid("float", "expected a number, got string")),
                ("style".into(), ResolveError::UnknownValidator { validator: "linestyle".into() }),
            ],
        };
        insta::assert_snapshot!(
            nested.to_string(),
            @"2 nested field(s) failed: 'width': validator 'float' rejected value: expected a number, got string; 'style': unknown validator 'linestyle'"
        );
    }
}
