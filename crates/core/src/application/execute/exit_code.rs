// Exit code policy and result building

use std::collections::HashMap;

use crate::domain::{ActionResult, ExecutionFault, EXIT_CODE_OUTPUT};

/// Decide the action outcome from the raw exit code.
/// The code is passed through unchanged on success.
pub fn check_exit_code(ignore_exit_code: bool, exit_code: i32) -> Result<i32, ExecutionFault> {
    if !ignore_exit_code && exit_code != 0 {
        return Err(ExecutionFault::NonZeroExitCode(exit_code));
    }
    Ok(exit_code)
}

/// `{"ExitCode": "<decimal>"}`. `i32`'s Display is locale-independent.
pub fn build_result(exit_code: i32) -> ActionResult {
    let mut output_values = HashMap::with_capacity(1);
    output_values.insert(EXIT_CODE_OUTPUT.to_string(), exit_code.to_string());
    ActionResult::new(output_values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_passes() {
        assert_eq!(check_exit_code(false, 0), Ok(0));
    }

    #[test]
    fn test_non_zero_fails_unless_ignored() {
        assert_eq!(
            check_exit_code(false, 3),
            Err(ExecutionFault::NonZeroExitCode(3))
        );
        assert_eq!(check_exit_code(true, 3), Ok(3));
        assert_eq!(check_exit_code(true, -1), Ok(-1));
    }

    #[test]
    fn test_result_is_plain_decimal() {
        assert_eq!(build_result(7).exit_code(), Some("7"));
        assert_eq!(build_result(1234567).exit_code(), Some("1234567"));
        assert_eq!(build_result(-1).exit_code(), Some("-1"));
        assert_eq!(build_result(0).output_values().len(), 1);
    }
}
