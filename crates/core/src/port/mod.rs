// Port Layer - Interfaces for external dependencies

pub mod exit_signal;
pub mod id_provider; // For deterministic testing
pub mod process_launcher;
pub mod time_provider;

// Re-exports
pub use exit_signal::{exit_signal, ExitSignal, ExitWait, ProcessExit};
pub use id_provider::IdProvider;
pub use process_launcher::{ExitSubscription, ProcessHandle, ProcessLauncher};
pub use time_provider::TimeProvider;
