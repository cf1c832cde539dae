// Execute Action - run an external process when a collection rule fires
//
// Options -> path validation -> launch -> exit wait -> exit code policy -> result

pub mod exit_code;
pub mod exit_waiter;
pub mod path_validator;

pub use exit_code::{build_result, check_exit_code};
pub use exit_waiter::ExitWaiter;
pub use path_validator::validate_file_path;

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::application::action::CollectionRuleAction;
use crate::application::cancellation::CancellationToken;
use crate::domain::{
    ActionError, ActionResult, ActionState, EndpointInfo, ExecuteOptions, Invocation,
    LaunchError,
};
use crate::port::{IdProvider, ProcessLauncher, TimeProvider};

/// Execute action
///
/// Stateless between invocations; every call owns its own process handle and
/// exit subscription. Cancellation stops the wait, never the process.
pub struct ExecuteAction {
    launcher: Arc<dyn ProcessLauncher>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl ExecuteAction {
    pub fn new(
        launcher: Arc<dyn ProcessLauncher>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            launcher,
            id_provider,
            time_provider,
        }
    }

    fn advance(invocation: &mut Invocation, next: ActionState) -> Result<(), ActionError> {
        invocation.advance(next)?;
        debug!(invocation_id = %invocation.id, state = %next, "Action state changed");
        Ok(())
    }

    async fn run(
        &self,
        invocation: &mut Invocation,
        options: &ExecuteOptions,
        cancellation: &CancellationToken,
    ) -> Result<ActionResult, ActionError> {
        Self::advance(invocation, ActionState::Validating)?;
        let path = Path::new(options.path());
        validate_file_path(path)?;

        // Completion signal must exist before the process does
        let waiter = ExitWaiter::new();

        Self::advance(invocation, ActionState::Starting)?;
        let mut process = match self.launcher.launch(path, options.arguments()) {
            Ok(process) => process,
            Err(source) => {
                Self::advance(invocation, ActionState::LaunchFailed)?;
                return Err(LaunchError {
                    path: path.to_path_buf(),
                    arguments: options.arguments().to_string(),
                    source,
                }
                .into());
            }
        };
        let pid = process.id();

        Self::advance(invocation, ActionState::Running)?;
        info!(
            invocation_id = %invocation.id,
            path = %options.path(),
            arguments = %options.arguments(),
            pid = ?pid,
            "Process started"
        );

        let exit_code = {
            let _subscription = waiter.attach(process.as_mut())?;
            match waiter.wait(cancellation).await {
                Ok(exit_code) => exit_code,
                Err(ActionError::Cancelled) => {
                    Self::advance(invocation, ActionState::Cancelled)?;
                    warn!(
                        invocation_id = %invocation.id,
                        pid = ?pid,
                        "Wait cancelled; process left running"
                    );
                    return Err(ActionError::Cancelled);
                }
                Err(e) => return Err(e),
            }
        };

        Self::advance(invocation, ActionState::Exited)?;
        debug!(invocation_id = %invocation.id, pid = ?pid, exit_code, "Process exited");

        let exit_code = check_exit_code(options.ignore_exit_code(), exit_code)?;
        Ok(build_result(exit_code))
    }
}

#[async_trait]
impl CollectionRuleAction for ExecuteAction {
    type Options = ExecuteOptions;

    async fn execute(
        &self,
        options: &ExecuteOptions,
        endpoint: &EndpointInfo,
        cancellation: CancellationToken,
    ) -> Result<ActionResult, ActionError> {
        let mut invocation = Invocation::new(
            self.id_provider.generate_id(),
            self.time_provider.now_millis(),
        );

        info!(
            invocation_id = %invocation.id,
            endpoint_pid = endpoint.process_id,
            path = %options.path(),
            "Executing action"
        );

        let outcome = self.run(&mut invocation, options, &cancellation).await;
        let now = self.time_provider.now_millis();

        let outcome = match outcome {
            Ok(result) => match invocation.complete(now) {
                Ok(()) => Ok(result),
                Err(e) => {
                    invocation.fail(now);
                    Err(e.into())
                }
            },
            Err(e) => {
                invocation.fail(now);
                Err(e)
            }
        };

        match &outcome {
            Ok(result) => info!(
                invocation_id = %invocation.id,
                exit_code = ?result.exit_code(),
                duration_ms = ?invocation.duration_ms(),
                "Action completed"
            ),
            Err(ActionError::Cancelled) => warn!(
                invocation_id = %invocation.id,
                duration_ms = ?invocation.duration_ms(),
                "Action cancelled"
            ),
            Err(e) => error!(
                invocation_id = %invocation.id,
                duration_ms = ?invocation.duration_ms(),
                error = %e,
                "Action failed"
            ),
        }

        outcome
    }
}
