//! Shared fixtures for end-to-end tests against real processes

#![allow(dead_code)]

use std::path::Path;
use std::sync::{Arc, Mutex};

use diagmon_core::application::ExecuteAction;
use diagmon_core::domain::ExecuteOptions;
use diagmon_core::port::id_provider::UuidProvider;
use diagmon_core::port::time_provider::SystemTimeProvider;
use diagmon_core::port::{ProcessHandle, ProcessLauncher};
use diagmon_infra_system::TokioProcessLauncher;

/// Real launcher that remembers the pid of every process it started
#[derive(Default)]
pub struct RecordingLauncher {
    inner: TokioProcessLauncher,
    pids: Mutex<Vec<u32>>,
}

impl RecordingLauncher {
    pub fn pids(&self) -> Vec<u32> {
        self.pids.lock().unwrap().clone()
    }
}

impl ProcessLauncher for RecordingLauncher {
    fn launch(&self, path: &Path, arguments: &str) -> std::io::Result<Box<dyn ProcessHandle>> {
        let handle = self.inner.launch(path, arguments)?;
        if let Some(pid) = handle.id() {
            self.pids.lock().unwrap().push(pid);
        }
        Ok(handle)
    }
}

pub fn execute_action(launcher: Arc<RecordingLauncher>) -> ExecuteAction {
    ExecuteAction::new(launcher, Arc::new(UuidProvider), Arc::new(SystemTimeProvider))
}

/// `/bin/sh -c "<script>"`
pub fn shell(script: &str) -> ExecuteOptions {
    ExecuteOptions::new("/bin/sh").with_arguments(format!("-c \"{}\"", script))
}

/// Kill a process left running by a cancelled action
pub fn kill(pid: u32) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
}
