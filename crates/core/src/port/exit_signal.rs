// Exit Signal - single-assignment completion signal for process exit
//
// Resolved either by the lifecycle notification (OS side) or by the waiter's own
// "already exited" re-check. Whoever comes first wins; later attempts are no-ops.

use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

/// What the completion signal carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessExit {
    /// Process terminated with this exit code
    Exited(i32),
    /// Exit could not be observed (e.g. wait syscall failed)
    Unobservable(String),
}

/// Sending half, cloneable so both resolution paths can hold it
#[derive(Debug, Clone)]
pub struct ExitSignal {
    tx: Arc<Mutex<Option<oneshot::Sender<ProcessExit>>>>,
}

/// Receiving half, owned by the waiter
#[derive(Debug)]
pub struct ExitWait {
    rx: oneshot::Receiver<ProcessExit>,
}

/// Create a fresh, unresolved completion signal
pub fn exit_signal() -> (ExitSignal, ExitWait) {
    let (tx, rx) = oneshot::channel();
    (
        ExitSignal {
            tx: Arc::new(Mutex::new(Some(tx))),
        },
        ExitWait { rx },
    )
}

impl ExitSignal {
    /// Resolve with an exit code. Returns false if already resolved.
    pub fn try_complete(&self, exit_code: i32) -> bool {
        self.resolve(ProcessExit::Exited(exit_code))
    }

    /// Resolve with an observation failure. Returns false if already resolved.
    pub fn try_fail(&self, reason: impl Into<String>) -> bool {
        self.resolve(ProcessExit::Unobservable(reason.into()))
    }

    pub fn is_resolved(&self) -> bool {
        self.lock().is_none()
    }

    fn resolve(&self, exit: ProcessExit) -> bool {
        match self.lock().take() {
            Some(tx) => {
                // Receiver may be gone if the invocation already finished
                let _ = tx.send(exit);
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<oneshot::Sender<ProcessExit>>> {
        self.tx.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ExitWait {
    /// Non-blocking check for an already resolved signal
    pub fn try_take(&mut self) -> Option<ProcessExit> {
        self.rx.try_recv().ok()
    }

    /// Suspend until the signal resolves
    pub async fn recv(&mut self) -> ProcessExit {
        match (&mut self.rx).await {
            Ok(exit) => exit,
            Err(_) => ProcessExit::Unobservable(
                "exit notification dropped before the process exit was reported".to_string(),
            ),
        }
    }
}
