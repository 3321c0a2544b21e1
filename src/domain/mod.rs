//! Domain layer: entities and pure tree logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod call_path;
pub mod entities;
pub mod error;
pub mod render;

pub use call_path::{CallPath, Frame};
pub use entities::*;
pub use error::DomainError;
pub use render::{parse_tree, render};
