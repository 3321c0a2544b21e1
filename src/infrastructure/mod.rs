//! Infrastructure layer: child processes and persisted state
//!
//! This layer implements the I/O boundary traits.

pub mod error;
pub mod process;
pub mod state_dict;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use process::{GuidedProcess, ProgramSpec};
pub use state_dict::StateDict;
