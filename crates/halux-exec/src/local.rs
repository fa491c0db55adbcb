//! Shell execution of configured commands on the local host

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, error, instrument};

use crate::error::ExecError;
use crate::result::CommandResult;
use crate::traits::CommandExecutor;

/// Runs probe, transition and script commands on this host.
///
/// Commands go through `sh -c` with stdin closed. A non-zero exit is an
/// ordinary result that the caller compares against its expected code; only
/// failing to start or wait on the shell is an error.
#[derive(Debug, Clone)]
pub struct LocalExecutor;

impl LocalExecutor {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// `sh -c <cmd>` with captured output; dropping the future kills the child
    fn shell(cmd: &str) -> Command {
        let mut command = Command::new("sh");
        command
            .arg("-c")
            .arg(cmd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    #[instrument(skip(self), level = "debug")]
    async fn execute(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(command = %cmd, "spawning shell");

        let output = Self::shell(cmd).output().await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
                ExecError::SpawnError(e.to_string())
            }
            _ => ExecError::IoError(e.to_string()),
        })?;

        // no exit code when killed by a signal
        let status = output.status.code().unwrap_or(-1);
        let result = CommandResult {
            status,
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            duration: start.elapsed(),
        };

        // probes fail routinely
        debug!(
            command = %cmd,
            status = result.status,
            stdout = %result.stdout.trim(),
            stderr = %result.stderr.trim(),
            duration = ?result.duration,
            "command completed"
        );

        Ok(result)
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandExecutor for LocalExecutor {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError> {
        self.execute(cmd).await
    }

    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout_duration: Duration,
    ) -> Result<CommandResult, ExecError> {
        let start = Instant::now();

        debug!(command = %cmd, timeout = ?timeout_duration, "spawning shell with deadline");

        match timeout(timeout_duration, self.execute(cmd)).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    command = %cmd,
                    timeout = ?timeout_duration,
                    elapsed = ?start.elapsed(),
                    "command exceeded its deadline, child killed"
                );
                Err(ExecError::Timeout {
                    timeout: timeout_duration,
                })
            }
        }
    }

    fn executor_type(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        let executor = LocalExecutor::new();
        let result = executor.run("echo hello").await.unwrap();

        assert!(result.success());
        assert_eq!(result.trimmed_stdout(), "hello");
    }

    #[tokio::test]
    async fn test_run_failure_is_not_an_error() {
        let executor = LocalExecutor::new();
        let result = executor.run("exit 42").await.unwrap();

        assert!(!result.success());
        assert_eq!(result.status, 42);
    }

    #[tokio::test]
    async fn test_run_uses_shell() {
        let executor = LocalExecutor::new();
        let result = executor.run("printf 'a\\nb\\n' | wc -l").await.unwrap();

        assert_eq!(result.trimmed_stdout(), "2");
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let executor = LocalExecutor::new();
        let result = executor
            .run_with_timeout("sleep 5", Duration::from_millis(100))
            .await;

        assert!(matches!(result, Err(ExecError::Timeout { .. })));
    }

    #[tokio::test]
    async fn test_killed_by_signal_has_negative_status() {
        let executor = LocalExecutor::new();
        let result = executor.run("kill -9 $$").await.unwrap();

        assert_eq!(result.status, -1);
        assert!(!result.success());
    }

    #[tokio::test]
    async fn test_run_with_stderr() {
        let executor = LocalExecutor::new();
        let result = executor.run("echo error >&2").await.unwrap();

        assert!(result.success());
        assert_eq!(result.stderr.trim(), "error");
        assert_eq!(executor.executor_type(), "local");
    }
}
