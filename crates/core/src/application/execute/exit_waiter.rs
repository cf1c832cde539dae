// Exit Waiter - race-free, cancellable wait for process exit
//
// The completion signal exists before the process is started. After subscribing
// to the exit notification the waiter re-checks the process itself, so an exit
// that happened between start and subscribe cannot be missed.

use tracing::{debug, warn};

use crate::application::cancellation::CancellationToken;
use crate::domain::{ActionError, ExecutionFault};
use crate::port::{exit_signal, ExitSignal, ExitSubscription, ExitWait, ProcessExit, ProcessHandle};

pub struct ExitWaiter {
    signal: ExitSignal,
    wait: ExitWait,
}

impl ExitWaiter {
    pub fn new() -> Self {
        let (signal, wait) = exit_signal();
        Self { signal, wait }
    }

    /// Subscribe to the exit notification of `process`, then resolve the signal
    /// directly if the process already exited.
    ///
    /// The returned guard unsubscribes when dropped.
    pub fn attach(&self, process: &mut dyn ProcessHandle) -> Result<ExitSubscription, ActionError> {
        let subscription = process
            .subscribe_exit(self.signal.clone())
            .map_err(|e| ExecutionFault::ExitStatusUnavailable(e.to_string()))?;

        match process.try_exit_code() {
            Ok(Some(exit_code)) => {
                if self.signal.try_complete(exit_code) {
                    debug!(
                        pid = ?process.id(),
                        exit_code,
                        "Process exited before exit notification was registered"
                    );
                }
            }
            Ok(None) => {}
            Err(e) => {
                // Still covered by the notification
                warn!(pid = ?process.id(), error = %e, "Exit re-check failed");
            }
        }

        Ok(subscription)
    }

    /// Suspend until the process exits or `cancellation` fires, whichever is first
    pub async fn wait(mut self, cancellation: &CancellationToken) -> Result<i32, ActionError> {
        let exit = match self.wait.try_take() {
            Some(exit) => exit,
            None => {
                tokio::select! {
                    biased;
                    exit = self.wait.recv() => exit,
                    _ = cancellation.cancelled() => return Err(ActionError::Cancelled),
                }
            }
        };

        match exit {
            ProcessExit::Exited(exit_code) => Ok(exit_code),
            ProcessExit::Unobservable(reason) => {
                Err(ExecutionFault::ExitStatusUnavailable(reason).into())
            }
        }
    }
}

impl Default for ExitWaiter {
    fn default() -> Self {
        Self::new()
    }
}
