//! Core error types for halux-core

use thiserror::Error;

/// Errors raised while building the registry or driving the bridge.
///
/// Probe and transition failures are never errors: they resolve to `false`
/// and end up published as `broken`.
#[derive(Error, Debug, Clone)]
pub enum CoreError {
    /// Two states share a name
    #[error("duplicate state: {0}")]
    DuplicateState(String),

    /// Two options of one state share a name
    #[error("duplicate option {option} in state {state}")]
    DuplicateOption {
        /// Owning state
        state: String,
        /// Repeated option name
        option: String,
    },

    /// Two scripts share a name
    #[error("duplicate script: {0}")]
    DuplicateScript(String),

    /// An option uses the name reserved for the broken sentinel
    #[error("state {0} has an option named \"broken\", which is reserved")]
    ReservedOptionName(String),

    /// A state has nothing to choose from
    #[error("state {0} has no options")]
    EmptyState(String),

    /// A name is empty, padded with whitespace or contains a topic separator or
    /// wildcard
    #[error("invalid {kind} name {name:?}: must be non-empty, unpadded and free of '/', '+' and '#'")]
    InvalidName {
        /// What was named: `state`, `option`, `script`, `device`
        kind: &'static str,
        /// Offending name
        name: String,
    },

    /// A state name collides with the scripts status topic
    #[error("state name {0:?} is reserved")]
    ReservedStateName(String),

    /// Publishing or subscribing failed
    #[error("transport error: {0}")]
    Transport(String),

    /// Actor communication error
    #[error("actor communication error: {0}")]
    ActorError(String),
}

impl CoreError {
    /// Check if the error comes from invalid configuration
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CoreError::DuplicateState(_)
                | CoreError::DuplicateOption { .. }
                | CoreError::DuplicateScript(_)
                | CoreError::ReservedOptionName(_)
                | CoreError::EmptyState(_)
                | CoreError::InvalidName { .. }
                | CoreError::ReservedStateName(_)
        )
    }
}

/// Reject names that cannot be embedded in a single topic level
///
/// # Errors
/// Returns [`CoreError::InvalidName`] for empty names, names with leading or
/// trailing whitespace (inbound payloads are trimmed, so such an option could
/// never be selected) and names containing `/`, `+` or `#`
pub fn check_name(kind: &'static str, name: &str) -> Result<(), CoreError> {
    if name.is_empty() || name.trim() != name || name.contains(['/', '+', '#']) {
        return Err(CoreError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_name() {
        assert!(check_name("state", "power").is_ok());
        assert!(check_name("state", "living-room light").is_ok());

        for bad in ["", "a/b", "a+b", "#", "power/", " on", "off\n"] {
            let err = check_name("state", bad).unwrap_err();
            assert!(err.is_config_error(), "{bad:?} should be rejected");
        }
    }
}
