// Argument string splitting
//
// The Execute action takes its arguments as a single string. Platforms without a
// native command line (everything but Windows) need it split into argv entries.

/// Split a command-line string into argv entries using shell word rules
///
/// Whitespace separates, single and double quotes group, backslash escapes.
/// Returns `None` when the string has an unterminated quote or a trailing escape.
pub fn split_arguments(arguments: &str) -> Option<Vec<String>> {
    shlex::split(arguments)
}
