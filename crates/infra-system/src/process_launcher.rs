// Tokio process launcher
// reason: tokio::process for async exit notification without blocking a thread
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, OnceLock};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use diagmon_core::port::{ExitSignal, ExitSubscription, ProcessHandle, ProcessLauncher};

/// Launches real OS processes
///
/// Stdout is redirected and drained (content is not kept). Stdin and stderr
/// are inherited. Dropping a handle never kills its process.
#[derive(Debug, Default)]
pub struct TokioProcessLauncher;

impl TokioProcessLauncher {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessLauncher for TokioProcessLauncher {
    fn launch(&self, path: &Path, arguments: &str) -> std::io::Result<Box<dyn ProcessHandle>> {
        let mut command = Command::new(path);
        apply_arguments(&mut command, arguments)?;
        command.stdout(Stdio::piped());

        let mut child = command.spawn()?;
        let pid = child.id();

        // Keep the pipe from filling up and blocking the child
        if let Some(mut stdout) = child.stdout.take() {
            tokio::spawn(async move {
                if let Err(e) = tokio::io::copy(&mut stdout, &mut tokio::io::sink()).await {
                    debug!(pid = ?pid, error = %e, "Stdout drain stopped");
                }
            });
        }

        debug!(path = %path.display(), pid = ?pid, "Spawned process");

        Ok(Box::new(TokioProcessHandle {
            pid,
            child: Some(child),
            observed_exit: Arc::new(OnceLock::new()),
        }))
    }
}

#[cfg(windows)]
fn apply_arguments(command: &mut Command, arguments: &str) -> std::io::Result<()> {
    // Windows processes parse their own command line
    if !arguments.is_empty() {
        command.raw_arg(arguments);
    }
    Ok(())
}

#[cfg(not(windows))]
fn apply_arguments(command: &mut Command, arguments: &str) -> std::io::Result<()> {
    let argv = diagmon_core::domain::split_arguments(arguments).ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "arguments contain an unterminated quote or escape",
        )
    })?;
    command.args(argv);
    Ok(())
}

/// Exit code of a finished process; signal terminations map to 128 + signal
pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    -1
}

/// Handle to a process spawned by [`TokioProcessLauncher`]
///
/// Until an exit notification is registered the handle owns the child. The
/// notification task then takes it over and records the exit code here. An exit
/// that already happened at subscription time is recorded immediately.
pub struct TokioProcessHandle {
    pid: Option<u32>,
    child: Option<Child>,
    observed_exit: Arc<OnceLock<i32>>,
}

impl ProcessHandle for TokioProcessHandle {
    fn id(&self) -> Option<u32> {
        self.pid
    }

    fn subscribe_exit(&mut self, signal: ExitSignal) -> std::io::Result<ExitSubscription> {
        let mut child = self.child.take().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "exit notification already registered for this process",
            )
        })?;

        // Record an exit that already happened so the caller's re-check sees it
        match child.try_wait() {
            Ok(Some(status)) => {
                let _ = self.observed_exit.set(exit_code_of(status));
            }
            Ok(None) => {}
            Err(e) => debug!(pid = ?self.pid, error = %e, "Exit probe before subscribe failed"),
        }

        let observed_exit = Arc::clone(&self.observed_exit);
        let pid = self.pid;

        let notifier = tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => {
                    let exit_code = exit_code_of(status);
                    let _ = observed_exit.set(exit_code);
                    if signal.try_complete(exit_code) {
                        debug!(pid = ?pid, exit_code, "Exit notification delivered");
                    }
                }
                Err(e) => {
                    warn!(pid = ?pid, error = %e, "Waiting for process exit failed");
                    signal.try_fail(e.to_string());
                }
            }
        });

        Ok(ExitSubscription::new(move || notifier.abort()))
    }

    fn try_exit_code(&mut self) -> std::io::Result<Option<i32>> {
        match self.child.as_mut() {
            Some(child) => Ok(child.try_wait()?.map(exit_code_of)),
            None => Ok(self.observed_exit.get().copied()),
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use diagmon_core::port::{exit_signal, ProcessExit};
    use std::time::Duration;
    use tokio::time::timeout;

    fn sh(script: &str) -> Box<dyn ProcessHandle> {
        TokioProcessLauncher::new()
            .launch(Path::new("/bin/sh"), &format!("-c \"{}\"", script))
            .unwrap()
    }

    #[tokio::test]
    async fn test_exit_notification_carries_exit_code() {
        let mut process = sh("exit 3");
        let (signal, mut wait) = exit_signal();

        let _subscription = process.subscribe_exit(signal).unwrap();

        let exit = timeout(Duration::from_secs(5), wait.recv()).await.unwrap();
        assert_eq!(exit, ProcessExit::Exited(3));
        assert_eq!(process.try_exit_code().unwrap(), Some(3));
    }

    #[tokio::test]
    async fn test_try_exit_code_before_subscribe() {
        let mut process = sh("exit 7");

        let mut exit_code = None;
        for _ in 0..100 {
            exit_code = process.try_exit_code().unwrap();
            if exit_code.is_some() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }

        assert_eq!(exit_code, Some(7));
    }

    #[tokio::test]
    async fn test_exit_before_subscribe_visible_to_recheck() {
        let mut process = sh("exit 5");
        // Let the process finish before anyone subscribes
        std::thread::sleep(Duration::from_millis(300));
        let (signal, _wait) = exit_signal();

        let _subscription = process.subscribe_exit(signal).unwrap();

        assert_eq!(process.try_exit_code().unwrap(), Some(5));
    }

    #[tokio::test]
    async fn test_unterminated_quote_fails_to_launch() {
        let result = TokioProcessLauncher::new().launch(Path::new("/bin/sh"), r#"-c "exit 3"#);

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(std::io::ErrorKind::InvalidInput)
        );
    }

    #[tokio::test]
    async fn test_second_subscription_rejected() {
        let mut process = sh("exit 0");
        let (signal, _wait) = exit_signal();

        let _first = process.subscribe_exit(signal.clone()).unwrap();
        let second = process.subscribe_exit(signal);

        assert_eq!(
            second.unwrap_err().kind(),
            std::io::ErrorKind::AlreadyExists
        );
    }

    #[tokio::test]
    async fn test_signal_termination_maps_to_128_plus_signal() {
        // SIGKILL = 9
        let mut process = sh("kill -9 $$");
        let (signal, mut wait) = exit_signal();

        let _subscription = process.subscribe_exit(signal).unwrap();

        let exit = timeout(Duration::from_secs(5), wait.recv()).await.unwrap();
        assert_eq!(exit, ProcessExit::Exited(137));
    }

    #[tokio::test]
    async fn test_missing_binary_fails_to_launch() {
        let result = TokioProcessLauncher::new().launch(Path::new("/no/such/binary"), "");

        assert_eq!(
            result.err().map(|e| e.kind()),
            Some(std::io::ErrorKind::NotFound)
        );
    }

    #[tokio::test]
    async fn test_large_stdout_does_not_block_exit() {
        let mut process = sh("head -c 1048576 /dev/zero; exit 0");
        let (signal, mut wait) = exit_signal();

        let _subscription = process.subscribe_exit(signal).unwrap();

        let exit = timeout(Duration::from_secs(10), wait.recv()).await.unwrap();
        assert_eq!(exit, ProcessExit::Exited(0));
    }
}
