//! halux-core: State reconciliation engine and bridge
//!
//! Options are probed to derive the current option of each state, moved
//! between with verified transitions, and exposed to the bus by the
//! [`Bridge`]. Each state runs inside its own actor.

pub mod actor;
pub mod bridge;
pub mod command;
pub mod config;
pub mod error;
pub mod message;
pub mod option;
pub mod registry;
pub mod script;
pub mod state;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod transport;

pub use actor::{ScriptActor, ScriptActorArgs, StateActor, StateActorArgs};
pub use bridge::Bridge;
pub use command::{Command, Probe, ShellCommand, Transition};
pub use config::{CommandConfig, OptionConfig, ScriptConfig, ShellConfig, StateConfig};
pub use error::{CoreError, check_name};
pub use message::{ActivateOption, DetermineCurrentOption, RunScript, ScriptOutcome};
pub use option::StateOption;
pub use registry::Registry;
pub use script::Script;
pub use state::{Activation, ActivationOutcome, CurrentOption, Rejection, State};
pub use transport::{InboundMessage, Transport, TransportEvent};
