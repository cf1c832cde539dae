// Action Error Types
//
// Every non-cancellation failure is enveloped in ActionError::Failed so the rule
// engine can log the cause uniformly; cancellation stays a separate case.

use std::path::PathBuf;
use thiserror::Error;

use super::error::DomainError;

/// Outcome of a failed action invocation
#[derive(Error, Debug)]
pub enum ActionError {
    #[error("Collection rule action failed: {0}")]
    Failed(#[from] ActionFailure),

    #[error("Collection rule action was cancelled")]
    Cancelled,
}

impl ActionError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ActionError::Cancelled)
    }

    /// Originating cause, if the action ran (or tried to) and failed
    pub fn failure(&self) -> Option<&ActionFailure> {
        match self {
            ActionError::Failed(failure) => Some(failure),
            ActionError::Cancelled => None,
        }
    }
}

/// Originating cause of a failed action
#[derive(Error, Debug)]
pub enum ActionFailure {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Execution(#[from] ExecutionFault),

    #[error(transparent)]
    InvalidState(#[from] DomainError),
}

/// Preconditions checked before any OS resource is allocated
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),
}

/// The OS refused or failed to create the process
#[derive(Error, Debug)]
#[error("Unable to start process '{}' with arguments '{arguments}': {source}", .path.display())]
pub struct LaunchError {
    pub path: PathBuf,
    pub arguments: String,
    #[source]
    pub source: std::io::Error,
}

/// The process ran but the action did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionFault {
    #[error("Process exited with non-zero exit code: {0}")]
    NonZeroExitCode(i32),

    #[error("Unable to observe process exit: {0}")]
    ExitStatusUnavailable(String),
}

impl From<ValidationError> for ActionError {
    fn from(err: ValidationError) -> Self {
        ActionError::Failed(err.into())
    }
}

impl From<LaunchError> for ActionError {
    fn from(err: LaunchError) -> Self {
        ActionError::Failed(err.into())
    }
}

impl From<ExecutionFault> for ActionError {
    fn from(err: ExecutionFault) -> Self {
        ActionError::Failed(err.into())
    }
}

impl From<DomainError> for ActionError {
    fn from(err: DomainError) -> Self {
        ActionError::Failed(err.into())
    }
}
