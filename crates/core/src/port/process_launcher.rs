// Process Launcher Port
// Abstraction over OS process creation and exit notification

use std::fmt;
use std::path::Path;

use super::exit_signal::ExitSignal;

/// Registration of an exit notification on a process handle.
///
/// Released exactly once: on drop, or earlier through [`ExitSubscription::release`].
pub struct ExitSubscription {
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl ExitSubscription {
    pub fn new(release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Unsubscribe now instead of at end of scope
    pub fn release(mut self) {
        self.run_release();
    }

    fn run_release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl Drop for ExitSubscription {
    fn drop(&mut self) {
        self.run_release();
    }
}

impl fmt::Debug for ExitSubscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExitSubscription")
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// Opaque handle to a spawned process, owned by a single invocation
pub trait ProcessHandle: Send {
    /// OS process id, if known
    fn id(&self) -> Option<u32>;

    /// Register `signal` to be resolved when the process terminates.
    ///
    /// # Errors
    /// Fails if a notification is already registered for this handle.
    fn subscribe_exit(&mut self, signal: ExitSignal) -> std::io::Result<ExitSubscription>;

    /// Non-blocking check: exit code if the process has already exited
    fn try_exit_code(&mut self) -> std::io::Result<Option<i32>>;
}

/// Process Launcher trait
///
/// Implementations:
/// - TokioProcessLauncher (infra-system): spawns an OS process
/// - MockProcessLauncher: scripted handles for tests
pub trait ProcessLauncher: Send + Sync {
    /// Start `path` with the raw `arguments` string, stdout redirected
    ///
    /// # Errors
    /// Returns the OS-level error if the process could not be created
    fn launch(&self, path: &Path, arguments: &str) -> std::io::Result<Box<dyn ProcessHandle>>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};

    /// How a mock process terminates
    #[derive(Debug, Clone)]
    pub enum MockExit {
        /// Exits before the exit notification is registered; the notification never fires
        BeforeSubscribe(i32),
        /// Exits after the delay and reports through the notification
        After(Duration, i32),
        /// Keeps running forever
        Never,
        /// Exit cannot be observed
        Unobservable(String),
    }

    /// Mock launcher behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Start a process that exits as described
        Launch(MockExit),
        /// OS refuses to create the process
        FailToStart(std::io::ErrorKind),
    }

    #[derive(Default)]
    struct Counters {
        launches: AtomicUsize,
        subscriptions: AtomicUsize,
        releases: AtomicUsize,
    }

    /// Mock Process Launcher for testing
    pub struct MockProcessLauncher {
        behavior: Arc<Mutex<MockBehavior>>,
        counters: Arc<Counters>,
        next_pid: AtomicU32,
        launched: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl MockProcessLauncher {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                counters: Arc::new(Counters::default()),
                next_pid: AtomicU32::new(10_000),
                launched: Arc::new(Mutex::new(Vec::new())),
            }
        }
        pub fn new_exiting(exit_code: i32) -> Self {
            Self::new(MockBehavior::Launch(MockExit::After(
                Duration::from_millis(10),
                exit_code,
            )))
        }
        pub fn new_never_exiting() -> Self {
            Self::new(MockBehavior::Launch(MockExit::Never))
        }
        /// Number of spawn attempts (successful or not)
        pub fn launch_count(&self) -> usize {
            self.counters.launches.load(Ordering::SeqCst)
        }
        pub fn subscribe_count(&self) -> usize {
            self.counters.subscriptions.load(Ordering::SeqCst)
        }
        pub fn release_count(&self) -> usize {
            self.counters.releases.load(Ordering::SeqCst)
        }
        /// (path, arguments) of every spawn attempt
        pub fn launched(&self) -> Vec<(String, String)> {
            self.launched.lock().unwrap().clone()
        }
    }

    impl ProcessLauncher for MockProcessLauncher {
        fn launch(
            &self,
            path: &Path,
            arguments: &str,
        ) -> std::io::Result<Box<dyn ProcessHandle>> {
            self.counters.launches.fetch_add(1, Ordering::SeqCst);
            self.launched
                .lock()
                .unwrap()
                .push((path.display().to_string(), arguments.to_string()));

            let behavior = self.behavior.lock().unwrap().clone();
            match behavior {
                MockBehavior::FailToStart(kind) => Err(std::io::Error::from(kind)),
                MockBehavior::Launch(exit) => Ok(Box::new(MockProcessHandle {
                    pid: self.next_pid.fetch_add(1, Ordering::SeqCst),
                    exit,
                    started: Instant::now(),
                    subscribed: false,
                    counters: Arc::clone(&self.counters),
                })),
            }
        }
    }

    struct MockProcessHandle {
        pid: u32,
        exit: MockExit,
        started: Instant,
        subscribed: bool,
        counters: Arc<Counters>,
    }

    impl ProcessHandle for MockProcessHandle {
        fn id(&self) -> Option<u32> {
            Some(self.pid)
        }

        fn subscribe_exit(&mut self, signal: ExitSignal) -> std::io::Result<ExitSubscription> {
            if self.subscribed {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    "exit notification already registered",
                ));
            }
            self.subscribed = true;
            self.counters.subscriptions.fetch_add(1, Ordering::SeqCst);

            let notifier = match self.exit.clone() {
                MockExit::After(delay, exit_code) => Some(tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    signal.try_complete(exit_code);
                })),
                MockExit::Unobservable(reason) => {
                    signal.try_fail(reason);
                    None
                }
                MockExit::BeforeSubscribe(_) | MockExit::Never => None,
            };

            let counters = Arc::clone(&self.counters);
            Ok(ExitSubscription::new(move || {
                counters.releases.fetch_add(1, Ordering::SeqCst);
                if let Some(notifier) = notifier {
                    notifier.abort();
                }
            }))
        }

        fn try_exit_code(&mut self) -> std::io::Result<Option<i32>> {
            Ok(match self.exit {
                MockExit::BeforeSubscribe(exit_code) => Some(exit_code),
                MockExit::After(delay, exit_code) if self.started.elapsed() >= delay => {
                    Some(exit_code)
                }
                _ => None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_subscription_released_once_on_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&releases);

        let subscription = ExitSubscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        drop(subscription);

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_explicit_release_does_not_release_again_on_drop() {
        let releases = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&releases);

        let subscription = ExitSubscription::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        subscription.release();

        assert_eq!(releases.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_mock_handle_rejects_second_subscription() {
        use super::super::exit_signal::exit_signal;
        use mocks::MockProcessLauncher;

        let launcher = MockProcessLauncher::new_never_exiting();
        let mut handle = launcher.launch(Path::new("/bin/true"), "").unwrap();

        let (signal, _wait) = exit_signal();
        let _first = handle.subscribe_exit(signal.clone()).unwrap();
        let second = handle.subscribe_exit(signal);

        assert_eq!(
            second.unwrap_err().kind(),
            std::io::ErrorKind::AlreadyExists
        );
        assert_eq!(launcher.subscribe_count(), 1);
    }
}
