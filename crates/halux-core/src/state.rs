//! State reconciliation
//!
//! A [`State`] owns an ordered set of mutually exclusive options. Which one is
//! current is never stored: every query re-runs the probes, because the host
//! may have changed in between.

use std::fmt;

use halux_api::{BROKEN, RESERVED_STATE_NAMES};
use halux_exec::CommandExecutor;
use kameo_macros::Reply;
use tracing::{error, info, warn};

use crate::config::StateConfig;
use crate::error::{CoreError, check_name};
use crate::option::StateOption;

/// The derived current option of a state
#[derive(Debug, Clone, PartialEq, Eq, Reply)]
pub enum CurrentOption {
    /// Exactly this option tests true (or is first among several)
    Named(String),
    /// No option tests true, or a transition could not be confirmed
    Broken,
}

impl CurrentOption {
    /// Name to publish, `broken` for the sentinel
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            CurrentOption::Named(name) => name,
            CurrentOption::Broken => BROKEN,
        }
    }

    #[must_use]
    pub fn is_broken(&self) -> bool {
        matches!(self, CurrentOption::Broken)
    }
}

impl fmt::Display for CurrentOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Why an activation request was refused without running anything
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// `broken` was requested; it can only be reached, never selected
    BrokenTarget,
    /// The state is broken, so there is no option to leave cleanly
    CurrentlyBroken,
    /// The requested option is not configured
    UnknownTarget,
}

/// What `activate_option` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActivationOutcome {
    /// Target was already current; nothing ran
    AlreadyCurrent,
    /// Request refused before any transition ran
    Rejected(Rejection),
    /// Current option was left and target entered, both verified
    Activated,
    /// Leaving the current option could not be confirmed
    DeactivateFailed { option: String },
    /// Entering the target could not be confirmed
    ActivateFailed { option: String },
}

/// Result of an activation request: what happened and what to publish
#[derive(Debug, Clone, PartialEq, Eq, Reply)]
pub struct Activation {
    pub outcome: ActivationOutcome,
    pub current: CurrentOption,
}

impl Activation {
    fn new(outcome: ActivationOutcome, current: CurrentOption) -> Self {
        Self { outcome, current }
    }
}

/// A named group of mutually exclusive options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    name: String,
    options: Vec<StateOption>,
}

impl State {
    /// Build a state, rejecting names unusable in topics and empty, duplicate
    /// or reserved option names
    ///
    /// # Errors
    /// Returns a configuration error if the options are not a valid set
    pub fn new(name: impl Into<String>, options: Vec<StateOption>) -> Result<Self, CoreError> {
        let name = name.into();

        check_name("state", &name)?;
        if RESERVED_STATE_NAMES.contains(&name.as_str()) {
            return Err(CoreError::ReservedStateName(name));
        }

        if options.is_empty() {
            return Err(CoreError::EmptyState(name));
        }

        for (i, option) in options.iter().enumerate() {
            check_name("option", option.name())?;
            if option.name() == BROKEN {
                return Err(CoreError::ReservedOptionName(name));
            }
            if options[..i].iter().any(|o| o.name() == option.name()) {
                return Err(CoreError::DuplicateOption {
                    state: name,
                    option: option.name().to_string(),
                });
            }
        }

        Ok(Self { name, options })
    }

    /// Build a state from its configuration
    ///
    /// # Errors
    /// Same as [`State::new`]
    pub fn from_config(config: &StateConfig) -> Result<Self, CoreError> {
        let options = config.options.iter().map(StateOption::from).collect();
        Self::new(config.name.clone(), options)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Options in configuration order
    #[must_use]
    pub fn options(&self) -> &[StateOption] {
        &self.options
    }

    /// Option names in configuration order
    pub fn option_names(&self) -> impl Iterator<Item = &str> {
        self.options.iter().map(StateOption::name)
    }

    #[must_use]
    pub fn option(&self, name: &str) -> Option<&StateOption> {
        self.options.iter().find(|o| o.name() == name)
    }

    /// Probe every option and return the first one that tests true.
    ///
    /// All probes run even after a match so that several options testing
    /// true at once gets logged.
    async fn find_current(&self, executor: &dyn CommandExecutor) -> Option<&StateOption> {
        info!(state = %self.name, "determining current option");

        let mut current: Option<&StateOption> = None;

        for option in &self.options {
            if option.test(executor).await {
                info!(state = %self.name, option = %option.name(), "test succeeded");
                if let Some(first) = current {
                    error!(
                        state = %self.name,
                        option = %option.name(),
                        first = %first.name(),
                        "test succeeded after another option already succeeded"
                    );
                } else {
                    current = Some(option);
                }
            } else {
                info!(state = %self.name, option = %option.name(), "test failed");
            }
        }

        match current {
            Some(option) => {
                info!(state = %self.name, option = %option.name(), "determined current option");
            }
            None => warn!(state = %self.name, "no option tests true, state is broken"),
        }

        current
    }

    /// Derive the current option from the probes
    pub async fn determine_current_option(&self, executor: &dyn CommandExecutor) -> CurrentOption {
        match self.find_current(executor).await {
            Some(option) => CurrentOption::Named(option.name().to_string()),
            None => CurrentOption::Broken,
        }
    }

    /// Move the state to `target`, deactivating the current option first.
    ///
    /// Always returns a definite option to publish. Any transition that cannot
    /// be confirmed leaves the state reported as broken.
    pub async fn activate_option(&self, executor: &dyn CommandExecutor, target: &str) -> Activation {
        let current = self.find_current(executor).await;
        let current_name = match current {
            Some(option) => CurrentOption::Named(option.name().to_string()),
            None => CurrentOption::Broken,
        };

        if target == BROKEN {
            warn!(state = %self.name, "cannot activate option broken");
            return Activation::new(
                ActivationOutcome::Rejected(Rejection::BrokenTarget),
                current_name,
            );
        }

        let Some(current) = current else {
            warn!(state = %self.name, target = %target, "cannot change because currently broken");
            return Activation::new(
                ActivationOutcome::Rejected(Rejection::CurrentlyBroken),
                CurrentOption::Broken,
            );
        };

        if current.name() == target {
            info!(state = %self.name, option = %target, "option is already current");
            return Activation::new(ActivationOutcome::AlreadyCurrent, current_name);
        }

        let Some(next) = self.option(target) else {
            let known: Vec<&str> = self.option_names().collect();
            warn!(
                state = %self.name,
                target = %target,
                known = ?known,
                "tried to activate unknown option"
            );
            return Activation::new(
                ActivationOutcome::Rejected(Rejection::UnknownTarget),
                current_name,
            );
        };

        if !current.deactivate(executor).await {
            warn!(state = %self.name, option = %current.name(), "failed to deactivate current option");
            return Activation::new(
                ActivationOutcome::DeactivateFailed {
                    option: current.name().to_string(),
                },
                CurrentOption::Broken,
            );
        }

        if next.activate(executor).await {
            info!(state = %self.name, from = %current.name(), to = %target, "option changed");
            Activation::new(
                ActivationOutcome::Activated,
                CurrentOption::Named(target.to_string()),
            )
        } else {
            warn!(state = %self.name, option = %target, "failed to activate option");
            Activation::new(
                ActivationOutcome::ActivateFailed {
                    option: target.to_string(),
                },
                CurrentOption::Broken,
            )
        }
    }
}
