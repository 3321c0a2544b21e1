//! Application layer: guided construction, protocol and controller services
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod builder;
pub mod error;
pub mod error_ext;
pub mod guide;
pub mod program;
pub mod protocol;
pub mod reward;
pub mod services;
pub mod shapes;

pub use builder::TreeBuilder;
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use guide::{StdioGuide, ValueSource};
pub use program::run_guided;
pub use protocol::Message;
