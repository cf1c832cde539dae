// Collection Rule Domain Model

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::action::ActionOptions;
use super::error::{DomainError, Result};

/// Ordered list of actions to run when a rule fires
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionRule {
    #[serde(default)]
    pub actions: Vec<ActionOptions>,

    /// Upper bound for each action; enforced by cancelling the action
    #[serde(default)]
    pub action_timeout_seconds: Option<u64>,
}

impl CollectionRule {
    pub fn new(actions: Vec<ActionOptions>) -> Self {
        Self {
            actions,
            action_timeout_seconds: None,
        }
    }

    pub fn action_timeout(&self) -> Option<Duration> {
        self.action_timeout_seconds.map(Duration::from_secs)
    }

    pub fn validate(&self, name: &str) -> Result<()> {
        if self.actions.is_empty() {
            return Err(DomainError::ValidationError(format!(
                "Collection rule '{}' has no actions",
                name
            )));
        }
        if self.action_timeout_seconds == Some(0) {
            return Err(DomainError::ValidationError(format!(
                "Collection rule '{}' has a zero action timeout",
                name
            )));
        }
        for (index, action) in self.actions.iter().enumerate() {
            action.validate().map_err(|e| {
                DomainError::ValidationError(format!(
                    "Collection rule '{}' action #{} ({}): {}",
                    name,
                    index,
                    action.action_name(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
