// Action Dispatcher - routes typed action options to their action

use std::sync::Arc;

use super::action::CollectionRuleAction;
use super::cancellation::CancellationToken;
use super::execute::ExecuteAction;
use crate::domain::{ActionError, ActionOptions, ActionResult, EndpointInfo};

/// Static registry of the actions this agent knows
pub struct ActionDispatcher {
    execute: Arc<ExecuteAction>,
}

impl ActionDispatcher {
    pub fn new(execute: Arc<ExecuteAction>) -> Self {
        Self { execute }
    }

    pub async fn dispatch(
        &self,
        options: &ActionOptions,
        endpoint: &EndpointInfo,
        cancellation: CancellationToken,
    ) -> Result<ActionResult, ActionError> {
        match options {
            ActionOptions::Execute(execute_options) => {
                self.execute
                    .execute(execute_options, endpoint, cancellation)
                    .await
            }
        }
    }
}
