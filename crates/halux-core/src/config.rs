//! Configuration types for states, options and scripts
//!
//! These mirror the configuration file one to one. Structural checks that
//! serde cannot express (unique names, reserved names) happen when the
//! [`Registry`](crate::registry::Registry) is built from them.

use serde::{Deserialize, Serialize};

/// A command the bridge can run, selected by its `type` field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandConfig {
    /// Run through `sh -c` on the local host
    Shell(ShellConfig),
}

/// Settings for a `shell` command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellConfig {
    /// Command line passed to `sh -c`
    pub command: String,
    /// Exit status that counts as success
    pub return_code: i32,
    /// If set, trimmed stdout must equal this exactly
    pub return_value: Option<String>,
    /// Abandon the command after this many seconds (no limit when absent)
    pub timeout_secs: Option<u64>,
}

/// One selectable option of a state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionConfig {
    /// Option name, unique within its state
    pub name: String,
    /// Probe deciding whether this option is currently active
    pub test: CommandConfig,
    /// Transition run to enter this option
    pub activate: Option<CommandConfig>,
    /// Transition run to leave this option
    pub deactivate: Option<CommandConfig>,
}

/// A named group of mutually exclusive options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateConfig {
    /// State name, unique across the bridge
    pub name: String,
    /// Options in announcement and probing order
    pub options: Vec<OptionConfig>,
}

/// A standalone fire-and-forget command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptConfig {
    /// Script name, unique across the bridge
    pub name: String,
    /// Command to run, written inline next to the name
    #[serde(flatten)]
    pub command: CommandConfig,
}
