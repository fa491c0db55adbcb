//! Error types for halux-exec

use std::time::Duration;

use thiserror::Error;

/// Errors that prevent a command from running to completion
#[derive(Error, Debug, Clone)]
pub enum ExecError {
    /// Command timed out
    #[error("command timed out after {timeout:?}")]
    Timeout {
        /// Timeout duration that was exceeded
        timeout: Duration,
    },

    /// Process spawn error
    #[error("failed to spawn process: {0}")]
    SpawnError(String),

    /// I/O error while waiting for the process
    #[error("I/O error: {0}")]
    IoError(String),
}

impl ExecError {
    /// Check if the command was started before the failure
    #[must_use]
    pub fn was_started(&self) -> bool {
        !matches!(self, ExecError::SpawnError(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_error_was_not_started() {
        assert!(!ExecError::SpawnError("no such file".into()).was_started());
        assert!(
            ExecError::Timeout {
                timeout: Duration::from_secs(1)
            }
            .was_started()
        );
    }

    #[test]
    fn test_error_display() {
        let err = ExecError::IoError("broken pipe".into());
        assert_eq!(err.to_string(), "I/O error: broken pipe");
    }
}
