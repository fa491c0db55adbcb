//! Actor implementations
//!
//! Every state is owned by its own actor, so calls into one state are
//! serialized by its mailbox. Scripts share a single actor because they
//! report through a shared status address.

pub mod script;
pub mod state;

pub use script::{ScriptActor, ScriptActorArgs};
pub use state::{StateActor, StateActorArgs};
