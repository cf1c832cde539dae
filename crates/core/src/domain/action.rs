// Action Domain Model

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::error::{DomainError, Result};

/// Name under which the rule configuration refers to the execute action
pub const EXECUTE_ACTION_NAME: &str = "Execute";

/// Output key carrying the exit code of the executed process
pub const EXIT_CODE_OUTPUT: &str = "ExitCode";

/// Options of the `Execute` action
///
/// Immutable once constructed. The rule engine owns it; the action only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteOptions {
    path: String,

    #[serde(default)]
    arguments: String,

    #[serde(default)]
    ignore_exit_code: bool,
}

impl ExecuteOptions {
    /// Create options for running the executable at `path` with no arguments
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            arguments: String::new(),
            ignore_exit_code: false,
        }
    }

    pub fn with_arguments(mut self, arguments: impl Into<String>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn with_ignore_exit_code(mut self, ignore_exit_code: bool) -> Self {
        self.ignore_exit_code = ignore_exit_code;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw argument string, handed to the process verbatim
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn ignore_exit_code(&self) -> bool {
        self.ignore_exit_code
    }

    /// Configuration-level check. Existence of the file is checked at execution time.
    pub fn validate(&self) -> Result<()> {
        if self.path.trim().is_empty() {
            return Err(DomainError::ValidationError(
                "Execute action requires a non-empty path".to_string(),
            ));
        }
        Ok(())
    }
}

/// Typed action configuration, tagged by action name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings")]
pub enum ActionOptions {
    Execute(ExecuteOptions),
}

impl ActionOptions {
    pub fn action_name(&self) -> &'static str {
        match self {
            ActionOptions::Execute(_) => EXECUTE_ACTION_NAME,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            ActionOptions::Execute(options) => options.validate(),
        }
    }
}

/// Structured outcome of a successful action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    output_values: HashMap<String, String>,
}

impl ActionResult {
    pub fn new(output_values: HashMap<String, String>) -> Self {
        Self { output_values }
    }

    pub fn output_values(&self) -> &HashMap<String, String> {
        &self.output_values
    }

    pub fn output(&self, key: &str) -> Option<&str> {
        self.output_values.get(key).map(String::as_str)
    }

    pub fn exit_code(&self) -> Option<&str> {
        self.output(EXIT_CODE_OUTPUT)
    }
}
