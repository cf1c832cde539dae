// Domain Layer - Pure business logic and entities

pub mod action;
pub mod action_error;
pub mod arguments;
pub mod endpoint;
pub mod error;
pub mod invocation;
pub mod rule;

// Re-exports
pub use action::{
    ActionOptions, ActionResult, ExecuteOptions, EXECUTE_ACTION_NAME, EXIT_CODE_OUTPUT,
};
pub use action_error::{ActionError, ActionFailure, ExecutionFault, LaunchError, ValidationError};
pub use arguments::split_arguments;
pub use endpoint::EndpointInfo;
pub use error::DomainError;
pub use invocation::{ActionState, Invocation, InvocationId};
pub use rule::CollectionRule;
