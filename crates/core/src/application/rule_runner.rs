// Rule Runner - runs the actions of fired collection rules
//
// Actions of a rule run in order and the first failure stops the rule.
// `action_timeout_seconds` and runner cancellation both cancel the in-flight
// action. Rules run concurrently and never share processes. No retries.

use futures::future::join_all;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::cancellation::{cancellation_channel, CancellationSource, CancellationToken};
use super::dispatcher::ActionDispatcher;
use crate::domain::{ActionError, ActionResult, CollectionRule, EndpointInfo};
use crate::error::Result;

/// Outcome of one rule firing
#[derive(Debug)]
pub struct RuleReport {
    pub rule: String,
    /// Results of the actions that succeeded, in order
    pub results: Vec<ActionResult>,
    /// Failure that stopped the rule, if any
    pub error: Option<ActionError>,
}

impl RuleReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn into_result(self) -> Result<Vec<ActionResult>> {
        match self.error {
            Some(e) => Err(e.into()),
            None => Ok(self.results),
        }
    }
}

pub struct RuleRunner {
    dispatcher: Arc<ActionDispatcher>,
}

impl RuleRunner {
    pub fn new(dispatcher: Arc<ActionDispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Reject rule sets that cannot run
    pub fn validate_rules(rules: &BTreeMap<String, CollectionRule>) -> Result<()> {
        for (name, rule) in rules {
            rule.validate(name)?;
        }
        Ok(())
    }

    /// Fire every rule once for `endpoint`
    pub async fn run_all(
        &self,
        rules: &BTreeMap<String, CollectionRule>,
        endpoint: &EndpointInfo,
        cancellation: &CancellationToken,
    ) -> Vec<RuleReport> {
        join_all(
            rules
                .iter()
                .map(|(name, rule)| self.run_rule(name, rule, endpoint, cancellation)),
        )
        .await
    }

    /// Fire a single rule
    pub async fn run_rule(
        &self,
        name: &str,
        rule: &CollectionRule,
        endpoint: &EndpointInfo,
        cancellation: &CancellationToken,
    ) -> RuleReport {
        let mut report = RuleReport {
            rule: name.to_string(),
            results: Vec::with_capacity(rule.actions.len()),
            error: None,
        };

        info!(rule = %name, actions = rule.actions.len(), "Collection rule fired");

        for (index, action) in rule.actions.iter().enumerate() {
            if cancellation.is_cancelled() {
                report.error = Some(ActionError::Cancelled);
                break;
            }

            let (source, token) = cancellation_channel();
            let limiter = spawn_action_limiter(
                name.to_string(),
                index,
                cancellation.clone(),
                rule.action_timeout(),
                source,
            );
            let outcome = self.dispatcher.dispatch(action, endpoint, token).await;
            limiter.abort();

            match outcome {
                Ok(result) => {
                    debug!(rule = %name, action = index, "Action succeeded");
                    report.results.push(result);
                }
                Err(e) => {
                    error!(
                        rule = %name,
                        action = index,
                        action_type = action.action_name(),
                        error = %e,
                        "Collection rule stopped"
                    );
                    report.error = Some(e);
                    break;
                }
            }
        }

        if report.is_success() {
            info!(rule = %name, "Collection rule completed");
        }
        report
    }
}

/// Cancel the action when the parent token fires or the timeout elapses
fn spawn_action_limiter(
    rule: String,
    index: usize,
    parent: CancellationToken,
    timeout: Option<Duration>,
    source: CancellationSource,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match timeout {
            Some(timeout) => {
                tokio::select! {
                    _ = parent.cancelled() => {
                        debug!(rule = %rule, action = index, "Rule cancelled");
                    }
                    _ = tokio::time::sleep(timeout) => {
                        warn!(
                            rule = %rule,
                            action = index,
                            timeout_secs = timeout.as_secs(),
                            "Action timed out"
                        );
                    }
                }
            }
            None => parent.cancelled().await,
        }
        source.cancel();
    })
}
