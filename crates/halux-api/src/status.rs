//! Status payloads

use std::fmt;

use serde::{Deserialize, Serialize};

/// Published on a state address when no option can be confirmed
pub const BROKEN: &str = "broken";

/// Published on the scripts address when no script is running
pub const IDLE: &str = "idle";

/// Payload of a `problem` binary sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProblemStatus {
    On,
    Off,
}

impl ProblemStatus {
    /// `On` when something is broken
    #[must_use]
    pub fn from_broken(broken: bool) -> Self {
        if broken { Self::On } else { Self::Off }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl fmt::Display for ProblemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
