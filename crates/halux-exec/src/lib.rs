//! halux-exec: Command execution abstraction
//!
//! Runs the shell commands behind probes, transitions and scripts on the
//! managed host and captures their exit status and output.

pub mod error;
pub mod local;
pub mod result;
pub mod traits;

pub use error::ExecError;
pub use local::LocalExecutor;
pub use result::CommandResult;
pub use traits::CommandExecutor;
