//! Error types for the portwatch-core library.

use thiserror::Error;

/// Result type alias for portwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during port discovery and process termination.
#[derive(Error, Debug)]
pub enum Error {
    /// Failed to execute a system command.
    #[error("Command execution failed: {0}")]
    CommandFailed(String),

    /// Failed to decode command output.
    #[error("Failed to parse output: {0}")]
    ParseError(String),

    /// A textual PID that cannot be signalled.
    #[error("Invalid PID: {0:?}")]
    InvalidPid(String),

    /// Failed to kill a process.
    #[error("Failed to kill process {pid}: {reason}")]
    KillFailed { pid: String, reason: String },

    /// Permission denied for an operation.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Platform not supported.
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::KillFailed {
            pid: "1234".to_string(),
            reason: "boom".to_string(),
        };
        assert!(err.to_string().contains("1234"));
        assert!(err.to_string().contains("boom"));

        let err = Error::InvalidPid("abc".to_string());
        assert_eq!(err.to_string(), "Invalid PID: \"abc\"");
    }
}
