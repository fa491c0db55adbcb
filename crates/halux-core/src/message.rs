//! Message types for actor communication
//!
//! Message handlers are implemented in their respective actor modules.

use kameo_macros::Reply;

// ============================================================================
// StateActor Messages
// ============================================================================

/// Probe all options and report the current one
#[derive(Debug)]
pub struct DetermineCurrentOption;

/// Move the state to another option
#[derive(Debug)]
pub struct ActivateOption {
    /// Requested option name, as received from the bus
    pub target: String,
}

// ============================================================================
// ScriptActor Messages
// ============================================================================

/// Run a script by name
#[derive(Debug)]
pub struct RunScript {
    /// Script to run
    pub name: String,
}

/// Script run result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reply)]
pub enum ScriptOutcome {
    /// The transition reported success
    Succeeded,
    /// The transition failed
    Failed,
    /// No script with that name is registered
    NotFound,
}
