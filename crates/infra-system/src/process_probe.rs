// Process liveness probe

/// Check whether a process with this id still exists
///
/// Unreaped zombies count as alive on unix.
pub fn is_process_alive(pid: u32) -> bool {
    #[cfg(unix)]
    {
        use nix::sys::signal::kill;
        use nix::unistd::Pid;

        let Ok(raw) = i32::try_from(pid) else {
            return false;
        };
        // No signal: existence and permission check only
        kill(Pid::from_raw(raw), None).is_ok()
    }

    #[cfg(windows)]
    {
        use std::process::Command;

        match Command::new("tasklist")
            .args(["/FI", &format!("PID eq {}", pid), "/NH"])
            .output()
        {
            Ok(output) => String::from_utf8_lossy(&output.stdout).contains(&pid.to_string()),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_process_is_alive() {
        assert!(is_process_alive(std::process::id()));
    }

    #[cfg(unix)]
    #[test]
    fn test_out_of_range_pid_is_not_alive() {
        assert!(!is_process_alive(u32::MAX));
    }
}
