//! Command executor trait

use std::time::Duration;

use async_trait::async_trait;

use crate::error::ExecError;
use crate::result::CommandResult;

/// Runs a command string and reports how it exited.
///
/// A non-zero exit status is not an error: it is returned in
/// [`CommandResult::status`]. `Err` is reserved for the command not running
/// to completion at all.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(&self, cmd: &str) -> Result<CommandResult, ExecError>;
    async fn run_with_timeout(
        &self,
        cmd: &str,
        timeout: Duration,
    ) -> Result<CommandResult, ExecError>;
    fn executor_type(&self) -> &'static str;
}
