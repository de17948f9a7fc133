//! Object and action matchers used by policy rules.

use regex::Regex;

/// Route-key match: a `*` in `pattern` matches any suffix, otherwise the
/// keys must be equal.
///
/// Only the first `*` is significant, so `prospects/*` matches
/// `prospects/42` and `prospects/` but not `prospects`.
pub fn key_match(key: &str, pattern: &str) -> bool {
    match pattern.find('*') {
        Some(star) => key.starts_with(&pattern[..star]),
        None => key == pattern,
    }
}

/// Compiles an action pattern so that it must match the whole action.
pub fn compile_action_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!("^(?:{pattern})$"))
}
