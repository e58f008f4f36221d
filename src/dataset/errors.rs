//! Dataset repository errors

use thiserror::Error;

use super::fields::DatasetKind;

/// Result type for dataset operations
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Dataset repository and dataset file errors
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Invalid dataset id '{0}': ids must be non-empty and contain no underscore")]
    InvalidId(String),

    #[error("Dataset not found: {0}")]
    NotFound(String),

    #[error("Dataset '{id}' is {expected} but holds a {found} record")]
    KindMismatch {
        id: String,
        expected: DatasetKind,
        found: DatasetKind,
    },

    #[error("Dataset '{0}' has no records")]
    Empty(String),

    #[error("Corrupt dataset file {path}: {reason}")]
    Corrupted { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl DatasetError {
    /// Returns true when the requested dataset does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatasetError::NotFound(_))
    }

    /// Returns true when a dataset file failed integrity checks
    pub fn is_corruption(&self) -> bool {
        matches!(self, DatasetError::Corrupted { .. })
    }

    pub(crate) fn corrupted(path: impl Into<String>, reason: impl Into<String>) -> Self {
        DatasetError::Corrupted {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
