//! `StateOption`: one selectable configuration of a state
//!
//! An option never remembers whether it is active. Its status is derived by
//! running the test probe, and both transitions are verified with that same
//! probe afterwards rather than trusting their own exit status.

use halux_exec::CommandExecutor;
use tracing::{error, info};

use crate::command::{Probe, Transition};
use crate::config::OptionConfig;

/// An option with a mandatory test and optional transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateOption {
    name: String,
    test: Probe,
    activate: Option<Transition>,
    deactivate: Option<Transition>,
}

impl StateOption {
    /// Option without transitions; activating and deactivating it are no-ops
    pub fn new(name: impl Into<String>, test: Probe) -> Self {
        Self {
            name: name.into(),
            test,
            activate: None,
            deactivate: None,
        }
    }

    #[must_use]
    pub fn with_activate(mut self, transition: Transition) -> Self {
        self.activate = Some(transition);
        self
    }

    #[must_use]
    pub fn with_deactivate(mut self, transition: Transition) -> Self {
        self.deactivate = Some(transition);
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the probe
    pub async fn test(&self, executor: &dyn CommandExecutor) -> bool {
        info!(option = %self.name, "running test");
        self.test.run(executor, &self.name).await
    }

    /// Enter this option. Succeeds only if the probe passes afterwards.
    pub async fn activate(&self, executor: &dyn CommandExecutor) -> bool {
        info!(option = %self.name, "running activate");

        let Some(transition) = &self.activate else {
            info!(option = %self.name, "nothing to activate");
            return true;
        };

        if !transition.run(executor, &self.name).await {
            error!(option = %self.name, "activate failed");
            return false;
        }

        if self.test(executor).await {
            info!(option = %self.name, "activate succeeded");
            true
        } else {
            error!(
                option = %self.name,
                "activate succeeded but test failed immediately afterwards"
            );
            false
        }
    }

    /// Leave this option. Succeeds only if the probe fails afterwards.
    pub async fn deactivate(&self, executor: &dyn CommandExecutor) -> bool {
        info!(option = %self.name, "running deactivate");

        let Some(transition) = &self.deactivate else {
            info!(option = %self.name, "nothing to deactivate");
            return true;
        };

        if !transition.run(executor, &self.name).await {
            error!(option = %self.name, "deactivate failed");
            return false;
        }

        if self.test(executor).await {
            error!(
                option = %self.name,
                "deactivate succeeded but test succeeded immediately afterwards"
            );
            false
        } else {
            info!(option = %self.name, "deactivate succeeded");
            true
        }
    }
}

impl From<&OptionConfig> for StateOption {
    fn from(config: &OptionConfig) -> Self {
        Self {
            name: config.name.clone(),
            test: Probe::from(&config.test),
            activate: config.activate.as_ref().map(Transition::from),
            deactivate: config.deactivate.as_ref().map(Transition::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, ShellCommand};
    use crate::test_utils::ScriptedExecutor;

    fn probe(cmd: &str) -> Probe {
        Probe::new(Command::Shell(ShellCommand::new(cmd, 0)))
    }

    fn transition(cmd: &str) -> Transition {
        Transition::new(Command::Shell(ShellCommand::new(cmd, 0)))
    }

    fn option() -> StateOption {
        StateOption::new("on", probe("check-on"))
            .with_activate(transition("turn-on"))
            .with_deactivate(transition("turn-off"))
    }

    #[tokio::test]
    async fn test_activate_without_transition_skips_test() {
        let executor = ScriptedExecutor::new();
        let opt = StateOption::new("on", probe("check-on"));

        assert!(opt.activate(&executor).await);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_deactivate_without_transition_skips_test() {
        let executor = ScriptedExecutor::new();
        let opt = StateOption::new("on", probe("check-on"));

        assert!(opt.deactivate(&executor).await);
        assert!(executor.calls().is_empty());
    }

    #[tokio::test]
    async fn test_activate_verified_by_test() {
        let executor = ScriptedExecutor::new()
            .with_default("turn-on", 0, "")
            .with_default("check-on", 0, "");

        assert!(option().activate(&executor).await);
        assert_eq!(executor.calls(), vec!["turn-on", "check-on"]);
    }

    #[tokio::test]
    async fn test_failed_activate_does_not_test() {
        let executor = ScriptedExecutor::new().with_default("turn-on", 1, "");

        assert!(!option().activate(&executor).await);
        assert_eq!(executor.calls(), vec!["turn-on"]);
    }

    #[tokio::test]
    async fn test_activate_fails_when_test_disagrees() {
        let executor = ScriptedExecutor::new()
            .with_default("turn-on", 0, "")
            .with_default("check-on", 1, "");

        assert!(!option().activate(&executor).await);
    }

    #[tokio::test]
    async fn test_deactivate_requires_test_to_fail() {
        let executor = ScriptedExecutor::new()
            .with_default("turn-off", 0, "")
            .with_default("check-on", 1, "");

        assert!(option().deactivate(&executor).await);
        assert_eq!(executor.calls(), vec!["turn-off", "check-on"]);
    }

    #[tokio::test]
    async fn test_deactivate_fails_when_still_active() {
        let executor = ScriptedExecutor::new()
            .with_default("turn-off", 0, "")
            .with_default("check-on", 0, "");

        assert!(!option().deactivate(&executor).await);
    }

    #[tokio::test]
    async fn test_failed_deactivate_does_not_test() {
        let executor = ScriptedExecutor::new().with_default("turn-off", 2, "");

        assert!(!option().deactivate(&executor).await);
        assert_eq!(executor.call_count("check-on"), 0);
    }
}
