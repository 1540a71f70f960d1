//! Error types for table and configuration I/O
//!
//! Covers:
//! - Reading tables and configuration files (ingress)
//! - Mapping records onto the cross-reference schema
//! - Writing results (egress)

use std::path::PathBuf;

/// Errors while loading or writing tables and configuration
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error on a file
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid JSON
    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// File is not valid YAML
    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration file is not valid TOML
    #[error("invalid configuration in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// No reader for the file extension
    #[error("unsupported table format: '{0}'")]
    UnsupportedFormat(String),

    /// Required column absent from a record
    #[error("record {record} has no '{field}' field")]
    MissingField { record: usize, field: String },

    /// Column present but not usable as a key
    #[error("record {record} field '{field}': {message}")]
    InvalidField {
        record: usize,
        field: String,
        message: String,
    },

    /// Table is not a sequence of records
    #[error("table {path} is not a list of records")]
    NotATable { path: PathBuf },

    /// Workspace precondition failed
    #[error("workspace error: {0}")]
    Workspace(String),
}

impl LoadError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create invalid field error
    pub fn invalid_field(record: usize, field: &str, message: impl Into<String>) -> Self {
        Self::InvalidField {
            record,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Check if the error is caused by the content of a table rather than
    /// by the file system or configuration
    #[inline]
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. } | Self::InvalidField { .. } | Self::NotATable { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_errors_are_input_errors() {
        assert!(LoadError::invalid_field(0, "Precinct", "member key is empty").is_input_error());
        assert!(LoadError::MissingField {
            record: 2,
            field: "VotePrec".to_string(),
        }
        .is_input_error());
        assert!(LoadError::NotATable {
            path: PathBuf::from("x.json"),
        }
        .is_input_error());
    }

    #[test]
    fn file_errors_are_not_input_errors() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(!LoadError::io_error("x.json", io).is_input_error());
        assert!(!LoadError::UnsupportedFormat("csv".to_string()).is_input_error());
        assert!(!LoadError::Workspace("no project".to_string()).is_input_error());
    }
}

/// Result alias for I/O operations
pub type LoadResult<T> = Result<T, LoadError>;
