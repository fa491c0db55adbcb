//! Fire-and-forget scripts

use halux_exec::CommandExecutor;
use tracing::info;

use crate::command::Transition;
use crate::config::ScriptConfig;

/// A named transition that is not part of any state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    name: String,
    transition: Transition,
}

impl Script {
    pub fn new(name: impl Into<String>, transition: Transition) -> Self {
        Self {
            name: name.into(),
            transition,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the transition; no test before or after
    pub async fn run(&self, executor: &dyn CommandExecutor) -> bool {
        info!(script = %self.name, "running script");
        self.transition.run(executor, &self.name).await
    }
}

impl From<&ScriptConfig> for Script {
    fn from(config: &ScriptConfig) -> Self {
        Self::new(config.name.clone(), Transition::from(&config.command))
    }
}
