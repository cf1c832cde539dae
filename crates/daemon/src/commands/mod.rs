// Command handlers

pub mod collect;
pub mod config_show;

use std::sync::Arc;

use diagmon_core::application::{ActionDispatcher, ExecuteAction, RuleRunner};
use diagmon_core::port::id_provider::UuidProvider;
use diagmon_core::port::time_provider::SystemTimeProvider;
use diagmon_infra_system::TokioProcessLauncher;

/// Wire the action stack (DI)
pub fn build_runner() -> RuleRunner {
    let execute = Arc::new(ExecuteAction::new(
        Arc::new(TokioProcessLauncher::new()),
        Arc::new(UuidProvider),
        Arc::new(SystemTimeProvider),
    ));
    RuleRunner::new(Arc::new(ActionDispatcher::new(execute)))
}
