//! Registry of every state and script the bridge exposes
//!
//! Built once from configuration and never changed afterwards.

use crate::config::{ScriptConfig, StateConfig};
use crate::error::{CoreError, check_name};
use crate::script::Script;
use crate::state::State;

/// All states and scripts, in configuration order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    states: Vec<State>,
    scripts: Vec<Script>,
}

impl Registry {
    /// Assemble a registry, rejecting duplicate state or script names
    ///
    /// # Errors
    /// Returns a configuration error on duplicate or malformed names
    pub fn new(states: Vec<State>, scripts: Vec<Script>) -> Result<Self, CoreError> {
        for (i, state) in states.iter().enumerate() {
            if states[..i].iter().any(|s| s.name() == state.name()) {
                return Err(CoreError::DuplicateState(state.name().to_string()));
            }
        }

        for (i, script) in scripts.iter().enumerate() {
            check_name("script", script.name())?;
            if scripts[..i].iter().any(|s| s.name() == script.name()) {
                return Err(CoreError::DuplicateScript(script.name().to_string()));
            }
        }

        Ok(Self { states, scripts })
    }

    /// Build every state and script from configuration
    ///
    /// # Errors
    /// Returns the first configuration error found
    pub fn from_config(states: &[StateConfig], scripts: &[ScriptConfig]) -> Result<Self, CoreError> {
        let states = states
            .iter()
            .map(State::from_config)
            .collect::<Result<Vec<_>, _>>()?;
        let scripts = scripts.iter().map(Script::from).collect();

        Self::new(states, scripts)
    }

    #[must_use]
    pub fn states(&self) -> &[State] {
        &self.states
    }

    #[must_use]
    pub fn scripts(&self) -> &[Script] {
        &self.scripts
    }

    #[must_use]
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().find(|s| s.name() == name)
    }

    #[must_use]
    pub fn script(&self, name: &str) -> Option<&Script> {
        self.scripts.iter().find(|s| s.name() == name)
    }

    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(State::name)
    }

    pub fn script_names(&self) -> impl Iterator<Item = &str> {
        self.scripts.iter().map(Script::name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CommandConfig, OptionConfig, ShellConfig};

    fn shell(cmd: &str) -> CommandConfig {
        CommandConfig::Shell(ShellConfig {
            command: cmd.to_string(),
            return_code: 0,
            return_value: None,
            timeout_secs: None,
        })
    }

    fn state(name: &str, options: &[&str]) -> StateConfig {
        StateConfig {
            name: name.to_string(),
            options: options
                .iter()
                .map(|o| OptionConfig {
                    name: (*o).to_string(),
                    test: shell(&format!("check-{o}")),
                    activate: None,
                    deactivate: None,
                })
                .collect(),
        }
    }

    fn script(name: &str) -> ScriptConfig {
        ScriptConfig {
            name: name.to_string(),
            command: shell(name),
        }
    }

    #[test]
    fn test_preserves_configuration_order() {
        let registry = Registry::from_config(
            &[state("power", &["on", "off"]), state("mode", &["eco", "turbo"])],
            &[script("reboot"), script("backup")],
        )
        .unwrap();

        assert_eq!(registry.state_names().collect::<Vec<_>>(), vec!["power", "mode"]);
        assert_eq!(registry.script_names().collect::<Vec<_>>(), vec!["reboot", "backup"]);
        assert_eq!(
            registry.state("power").unwrap().option_names().collect::<Vec<_>>(),
            vec!["on", "off"]
        );
        assert!(registry.script("backup").is_some());
        assert!(registry.state("missing").is_none());
    }

    #[test]
    fn test_rejects_duplicate_state() {
        let result = Registry::from_config(&[state("power", &["on"]), state("power", &["off"])], &[]);

        assert!(matches!(result, Err(CoreError::DuplicateState(name)) if name == "power"));
    }

    #[test]
    fn test_rejects_duplicate_script() {
        let result = Registry::from_config(&[], &[script("reboot"), script("reboot")]);

        assert!(matches!(result, Err(CoreError::DuplicateScript(_))));
    }

    #[test]
    fn test_option_errors_propagate() {
        let result = Registry::from_config(&[state("power", &["on", "broken"])], &[]);

        let err = result.unwrap_err();
        assert!(err.is_config_error());
        assert!(matches!(err, CoreError::ReservedOptionName(_)));
    }

    #[test]
    fn test_rejects_script_name_unusable_in_topics() {
        let result = Registry::from_config(&[], &[script("clean/all")]);

        assert!(matches!(
            result,
            Err(CoreError::InvalidName { kind: "script", name }) if name == "clean/all"
        ));
    }

    #[test]
    fn test_empty_registry_is_valid() {
        let registry = Registry::from_config(&[], &[]).unwrap();
        assert!(registry.states().is_empty());
        assert!(registry.scripts().is_empty());
    }
}
