//! CLI-specific error types
//!
//! Query failures are not CLI errors: they are reported in the response
//! body. A `CliError` means the command itself could not run.

use std::fmt;
use std::io;

use crate::dataset::DatasetError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout/files)
    IoError,
    /// Input records or arguments rejected
    InvalidInput,
    /// Dataset repository failure
    DatasetError,
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "INSIGHT_CLI_CONFIG_ERROR",
            Self::IoError => "INSIGHT_CLI_IO_ERROR",
            Self::InvalidInput => "INSIGHT_CLI_INVALID_INPUT",
            Self::DatasetError => "INSIGHT_CLI_DATASET_ERROR",
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
}

impl CliError {
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::InvalidInput, msg)
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<DatasetError> for CliError {
    fn from(e: DatasetError) -> Self {
        match e {
            DatasetError::InvalidId(_) | DatasetError::Empty(_) | DatasetError::KindMismatch { .. } => {
                Self::invalid_input(e.to_string())
            }
            other => Self::new(CliErrorCode::DatasetError, other.to_string()),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = CliError::config_error("max_result_rows must be > 0");
        assert_eq!(
            err.to_string(),
            "INSIGHT_CLI_CONFIG_ERROR: max_result_rows must be > 0"
        );
    }

    #[test]
    fn test_from_dataset_error() {
        let err: CliError = DatasetError::InvalidId("a_b".into()).into();
        assert_eq!(err.code(), &CliErrorCode::InvalidInput);
        let err: CliError = DatasetError::NotFound("x".into()).into();
        assert_eq!(err.code(), &CliErrorCode::DatasetError);
    }
}
