//! CLI-level errors (wraps infrastructure errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("cannot open input: {0}")]
    NoInput(PathBuf),

    #[error("{0}")]
    Usage(String),
}

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::NoInput(_) => crate::exitcode::NOINPUT,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Spawn { .. } => crate::exitcode::OSERR,
                InfraError::Application(e) => match e {
                    ApplicationError::Domain(_)
                    | ApplicationError::MissingValue
                    | ApplicationError::MalformedValue { .. } => crate::exitcode::DATAERR,
                    ApplicationError::Protocol { .. }
                    | ApplicationError::ActionMismatch { .. }
                    | ApplicationError::ProgramExited { .. }
                    | ApplicationError::Timeout { .. } => crate::exitcode::PROTOCOL,
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                },
            },
        }
    }
}
