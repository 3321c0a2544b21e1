//! Application-level errors (wraps domain errors)

use thiserror::Error;

use crate::domain::DomainError;

/// Application errors wrap domain errors and add protocol-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("no guided value: input closed")]
    MissingValue,

    #[error("malformed guided value {line:?}: expected {expected}")]
    MalformedValue { line: String, expected: &'static str },

    #[error("protocol violation: {message}")]
    Protocol { message: String },

    #[error("action echo mismatch: sent {sent}, program echoed {echoed}")]
    ActionMismatch { sent: f64, echoed: String },

    #[error("guided program exited before {expected}")]
    ProgramExited { expected: &'static str },

    #[error("no output from guided program within {seconds}s")]
    Timeout { seconds: u64 },

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ApplicationError {
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
