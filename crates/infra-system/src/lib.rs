// diagmon Infrastructure - System Adapters
// Implements: ProcessLauncher (OS processes via tokio)

pub mod process_launcher;
pub mod process_probe;

pub use process_launcher::{TokioProcessHandle, TokioProcessLauncher};
pub use process_probe::is_process_alive;
