// Collection Rule Action contract
// What the rule engine calls when a rule fires

use async_trait::async_trait;

use super::cancellation::CancellationToken;
use crate::domain::{ActionError, ActionResult, EndpointInfo};

/// Collection Rule Action trait
///
/// Implementations:
/// - ExecuteAction: runs an external process
#[async_trait]
pub trait CollectionRuleAction: Send + Sync {
    /// Typed settings of this action
    type Options: Send + Sync;

    /// Run the action once
    ///
    /// # Errors
    /// - ActionError::Failed carrying the originating cause
    /// - ActionError::Cancelled if `cancellation` fired first
    async fn execute(
        &self,
        options: &Self::Options,
        endpoint: &EndpointInfo,
        cancellation: CancellationToken,
    ) -> Result<ActionResult, ActionError>;
}
