//! Probe and transition primitives
//!
//! Both wrap a [`Command`] and share its success rule; they differ only in
//! intent. A probe reads host status, a transition changes it.

use std::time::Duration;

use halux_exec::{CommandExecutor, CommandResult};
use tracing::{info, warn};

use crate::config::{CommandConfig, ShellConfig};

/// A runnable command, one variant per supported command type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Shell(ShellCommand),
}

impl Command {
    /// Run the command, resolving every failure mode to `false`.
    ///
    /// `owner` is the option or script the command belongs to, for logs.
    pub async fn run(&self, executor: &dyn CommandExecutor, owner: &str) -> bool {
        match self {
            Command::Shell(shell) => shell.run(executor, owner).await,
        }
    }
}

impl From<&CommandConfig> for Command {
    fn from(config: &CommandConfig) -> Self {
        match config {
            CommandConfig::Shell(shell) => Command::Shell(ShellCommand::from(shell)),
        }
    }
}

/// A shell command with its expected exit status and output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    command: String,
    return_code: i32,
    return_value: Option<String>,
    timeout: Option<Duration>,
}

impl ShellCommand {
    /// Command succeeding when it exits with `return_code`
    pub fn new(command: impl Into<String>, return_code: i32) -> Self {
        Self {
            command: command.into(),
            return_code,
            return_value: None,
            timeout: None,
        }
    }

    /// Additionally require trimmed stdout to equal `value`
    #[must_use]
    pub fn with_return_value(mut self, value: impl Into<String>) -> Self {
        self.return_value = Some(value.into());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Check a finished run against the expected status and output
    #[must_use]
    pub fn matches(&self, result: &CommandResult) -> bool {
        if result.status != self.return_code {
            return false;
        }
        match &self.return_value {
            Some(expected) => expected == result.trimmed_stdout(),
            None => true,
        }
    }

    async fn run(&self, executor: &dyn CommandExecutor, owner: &str) -> bool {
        info!(owner = %owner, command = %self.command, "running command");

        let outcome = match self.timeout {
            Some(timeout) => executor.run_with_timeout(&self.command, timeout).await,
            None => executor.run(&self.command).await,
        };

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(owner = %owner, command = %self.command, error = %e, "command did not complete");
                return false;
            }
        };

        if result.status != self.return_code {
            info!(
                owner = %owner,
                expected = self.return_code,
                actual = result.status,
                "command failed on exit status"
            );
            return false;
        }

        if !self.matches(&result) {
            info!(
                owner = %owner,
                expected = ?self.return_value,
                actual = %result.trimmed_stdout(),
                "command failed on output"
            );
            return false;
        }

        true
    }
}

impl From<&ShellConfig> for ShellCommand {
    fn from(config: &ShellConfig) -> Self {
        Self {
            command: config.command.clone(),
            return_code: config.return_code,
            return_value: config.return_value.clone(),
            timeout: config.timeout_secs.map(Duration::from_secs),
        }
    }
}

/// Read-only check of host status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Probe(Command);

impl Probe {
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self(command)
    }

    pub async fn run(&self, executor: &dyn CommandExecutor, owner: &str) -> bool {
        self.0.run(executor, owner).await
    }
}

impl From<&CommandConfig> for Probe {
    fn from(config: &CommandConfig) -> Self {
        Self(Command::from(config))
    }
}

/// Side-effecting action that changes host status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition(Command);

impl Transition {
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self(command)
    }

    pub async fn run(&self, executor: &dyn CommandExecutor, owner: &str) -> bool {
        self.0.run(executor, owner).await
    }
}

impl From<&CommandConfig> for Transition {
    fn from(config: &CommandConfig) -> Self {
        Self(Command::from(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::ScriptedExecutor;

    fn shell(cmd: &str, code: i32) -> Command {
        Command::Shell(ShellCommand::new(cmd, code))
    }

    #[tokio::test]
    async fn test_matching_status_succeeds() {
        let executor = ScriptedExecutor::new().with_default("check", 0, "whatever");

        assert!(shell("check", 0).run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_status_mismatch_fails() {
        let executor = ScriptedExecutor::new().with_default("check", 1, "");

        assert!(!shell("check", 0).run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_expected_non_zero_status() {
        let executor = ScriptedExecutor::new().with_default("check", 3, "");

        assert!(shell("check", 3).run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_output_compared_after_trimming() {
        let executor = ScriptedExecutor::new().with_default("state", 0, "  active\n");
        let command =
            Command::Shell(ShellCommand::new("state", 0).with_return_value("active"));

        assert!(command.run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_output_mismatch_fails_despite_status() {
        let executor = ScriptedExecutor::new().with_default("state", 0, "inactive");
        let command =
            Command::Shell(ShellCommand::new("state", 0).with_return_value("active"));

        assert!(!command.run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_spawn_failure_resolves_to_false() {
        let executor = ScriptedExecutor::new().with_spawn_failure("missing");

        assert!(!shell("missing", 0).run(&executor, "opt").await);
    }

    #[tokio::test]
    async fn test_timeout_is_passed_to_executor() {
        let executor = ScriptedExecutor::new().with_default("slow", 0, "");
        let command =
            Command::Shell(ShellCommand::new("slow", 0).with_timeout(Duration::from_secs(5)));

        assert!(command.run(&executor, "opt").await);
        assert_eq!(executor.timeouts(), vec![Duration::from_secs(5)]);
    }

    #[test]
    fn test_from_config() {
        let config = CommandConfig::Shell(ShellConfig {
            command: "true".to_string(),
            return_code: 0,
            return_value: Some("ok".to_string()),
            timeout_secs: Some(2),
        });

        let expected = Command::Shell(
            ShellCommand::new("true", 0)
                .with_return_value("ok")
                .with_timeout(Duration::from_secs(2)),
        );
        assert_eq!(Command::from(&config), expected);
    }
}
