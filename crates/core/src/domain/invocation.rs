// Action Invocation Domain Model
//
// NOT_STARTED -> VALIDATING -> STARTING -> RUNNING -> {EXITED | CANCELLED | LAUNCH_FAILED}
//   -> {COMPLETED | FAILED}

use serde::{Deserialize, Serialize};

use super::error::{DomainError, Result};

/// Invocation ID (UUID v4)
pub type InvocationId = String;

/// Per-invocation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionState {
    NotStarted,
    Validating,
    Starting,
    Running,
    Exited,
    Cancelled,
    LaunchFailed,
    Completed,
    Failed,
}

impl std::fmt::Display for ActionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionState::NotStarted => write!(f, "NOT_STARTED"),
            ActionState::Validating => write!(f, "VALIDATING"),
            ActionState::Starting => write!(f, "STARTING"),
            ActionState::Running => write!(f, "RUNNING"),
            ActionState::Exited => write!(f, "EXITED"),
            ActionState::Cancelled => write!(f, "CANCELLED"),
            ActionState::LaunchFailed => write!(f, "LAUNCH_FAILED"),
            ActionState::Completed => write!(f, "COMPLETED"),
            ActionState::Failed => write!(f, "FAILED"),
        }
    }
}

impl ActionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActionState::Completed | ActionState::Failed)
    }

    /// Allowed forward transitions. Any non-terminal state may fail.
    pub fn can_transition_to(&self, next: ActionState) -> bool {
        use ActionState::*;
        match (self, next) {
            (NotStarted, Validating)
            | (Validating, Starting)
            | (Starting, Running)
            | (Starting, LaunchFailed)
            | (Running, Exited)
            | (Running, Cancelled)
            | (Exited, Completed) => true,
            (current, Failed) => !current.is_terminal() && *current != NotStarted,
            _ => false,
        }
    }
}

/// One run of an action, tracked from validation to its terminal state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invocation {
    pub id: InvocationId,
    pub state: ActionState,
    pub started_at: i64, // epoch ms
    pub finished_at: Option<i64>,
}

impl Invocation {
    pub fn new(id: impl Into<String>, started_at: i64) -> Self {
        Self {
            id: id.into(),
            state: ActionState::NotStarted,
            started_at,
            finished_at: None,
        }
    }

    /// Move to a non-terminal state
    pub fn advance(&mut self, next: ActionState) -> Result<()> {
        if next.is_terminal() || !self.state.can_transition_to(next) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Transition to Completed with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        if !self.state.can_transition_to(ActionState::Completed) {
            return Err(DomainError::InvalidStateTransition {
                from: self.state.to_string(),
                to: ActionState::Completed.to_string(),
            });
        }
        self.state = ActionState::Completed;
        self.finished_at = Some(now_millis);
        Ok(())
    }

    /// Mark as Failed with explicit timestamp
    pub fn fail(&mut self, now_millis: i64) {
        self.state = ActionState::Failed;
        self.finished_at = Some(now_millis);
    }

    pub fn duration_ms(&self) -> Option<i64> {
        self.finished_at.map(|finished| finished - self.started_at)
    }
}
