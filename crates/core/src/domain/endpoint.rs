// Endpoint Domain Model

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use uuid::Uuid;

/// Describes the monitored target process an action runs on behalf of.
/// Actions receive it as context; the execute action only logs it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointInfo {
    pub process_id: u32,
    pub runtime_instance_cookie: Uuid,
    pub command_line: Option<String>,
    pub operating_system: String,
    pub process_architecture: String,
}

impl EndpointInfo {
    pub fn new(process_id: u32, runtime_instance_cookie: Uuid) -> Self {
        Self {
            process_id,
            runtime_instance_cookie,
            command_line: None,
            operating_system: std::env::consts::OS.to_string(),
            process_architecture: std::env::consts::ARCH.to_string(),
        }
    }

    /// Endpoint describing the agent process itself
    pub fn current_process() -> Self {
        Self {
            command_line: Some(command_line_of(std::env::args_os())),
            ..Self::new(std::process::id(), Uuid::new_v4())
        }
    }
}

/// Join argv lossily; arguments need not be valid UTF-8
fn command_line_of(args: impl IntoIterator<Item = OsString>) -> String {
    args.into_iter()
        .map(|arg| arg.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}
