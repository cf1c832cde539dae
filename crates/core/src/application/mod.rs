// Application Layer - Use Cases and Business Logic

pub mod action;
pub mod cancellation;
pub mod dispatcher;
pub mod execute;
pub mod rule_runner;

// Re-exports
pub use action::CollectionRuleAction;
pub use cancellation::{cancellation_channel, CancellationSource, CancellationToken};
pub use dispatcher::ActionDispatcher;
pub use execute::ExecuteAction;
pub use rule_runner::{RuleReport, RuleRunner};
