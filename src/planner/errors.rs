//! Query error types
//!
//! Error codes:
//! - INSIGHT_QUERY_INVALID (VALIDATION)
//! - INSIGHT_DATASET_NOT_FOUND (NOT_FOUND)
//! - INSIGHT_RESULT_TOO_LARGE (RESULT_TOO_LARGE)
//!
//! All three are terminal for the query. Callers map the kind to an outward
//! status; the message is for humans.

use std::fmt;

use crate::dataset::DatasetError;

/// Failure classes a caller can distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Query is malformed or references fields it may not
    Validation,
    /// Target dataset does not exist
    NotFound,
    /// Query is valid but produced more rows than allowed
    ResultTooLarge,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "VALIDATION"),
            ErrorKind::NotFound => write!(f, "NOT_FOUND"),
            ErrorKind::ResultTooLarge => write!(f, "RESULT_TOO_LARGE"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryErrorCode {
    /// Malformed query structure or semantics
    InsightQueryInvalid,
    /// Referenced dataset id is not stored
    InsightDatasetNotFound,
    /// Row count exceeded the result cap
    InsightResultTooLarge,
}

impl QueryErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            QueryErrorCode::InsightQueryInvalid => "INSIGHT_QUERY_INVALID",
            QueryErrorCode::InsightDatasetNotFound => "INSIGHT_DATASET_NOT_FOUND",
            QueryErrorCode::InsightResultTooLarge => "INSIGHT_RESULT_TOO_LARGE",
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            QueryErrorCode::InsightQueryInvalid => ErrorKind::Validation,
            QueryErrorCode::InsightDatasetNotFound => ErrorKind::NotFound,
            QueryErrorCode::InsightResultTooLarge => ErrorKind::ResultTooLarge,
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Query error with full context
#[derive(Debug, Clone)]
pub struct QueryError {
    code: QueryErrorCode,
    message: String,
}

impl QueryError {
    /// Create a query invalid error
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            code: QueryErrorCode::InsightQueryInvalid,
            message: reason.into(),
        }
    }

    /// Create a dataset not found error
    pub fn dataset_not_found(id: impl AsRef<str>) -> Self {
        Self {
            code: QueryErrorCode::InsightDatasetNotFound,
            message: format!("Dataset '{}' not found", id.as_ref()),
        }
    }

    /// Create a result too large error
    pub fn result_too_large(rows: usize, limit: usize) -> Self {
        Self {
            code: QueryErrorCode::InsightResultTooLarge,
            message: format!("Query produced {} rows; at most {} allowed", rows, limit),
        }
    }

    pub fn code(&self) -> QueryErrorCode {
        self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind(), self.code.code(), self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<DatasetError> for QueryError {
    fn from(err: DatasetError) -> Self {
        match err {
            DatasetError::NotFound(id) => QueryError::dataset_not_found(id),
            other => QueryError::invalid(other.to_string()),
        }
    }
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;
