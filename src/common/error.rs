//! Error types for the e2e harness
//!
//! Only setup and reporting can fail with these errors. Anything that goes
//! wrong inside a single step is folded into that step's recorded result so
//! the rest of the run keeps going.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the e2e harness
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    // === HTTP Errors ===
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    // === Fixture Errors ===
    #[error("Failed to prepare upload fixture '{path}': {error}")]
    Fixture { path: String, error: String },

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Serialization Errors ===
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Run Outcome ===
    #[error("{failed} of {total} checks failed")]
    ChecksFailed { failed: usize, total: usize },
}

impl Error {
    /// Create a fixture error for the given path
    pub fn fixture<P: AsRef<std::path::Path>>(path: P, error: impl ToString) -> Self {
        Self::Fixture {
            path: path.as_ref().display().to_string(),
            error: error.to_string(),
        }
    }

    /// Create a file read error for the given path
    pub fn file_read<P: AsRef<std::path::Path>>(path: P, error: impl ToString) -> Self {
        Self::FileRead {
            path: path.as_ref().display().to_string(),
            error: error.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checks_failed_message() {
        let err = Error::ChecksFailed {
            failed: 3,
            total: 20,
        };
        assert_eq!(err.to_string(), "3 of 20 checks failed");
    }

    #[test]
    fn test_fixture_error_includes_path() {
        let err = Error::fixture("/tmp/piperag-e2e/test.txt", "permission denied");
        let msg = err.to_string();
        assert!(msg.contains("/tmp/piperag-e2e/test.txt"));
        assert!(msg.contains("permission denied"));
    }
}
