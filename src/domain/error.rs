//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent malformed tree data.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("malformed tree at byte {position}: {message}")]
    MalformedTree { position: usize, message: String },

    #[error("invalid node value at byte {position}: {value:?}")]
    InvalidValue { position: usize, value: String },

    #[error("trailing input after tree at byte {0}")]
    TrailingInput(usize),
}
