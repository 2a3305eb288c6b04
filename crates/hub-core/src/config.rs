//! Small helpers for reading service configuration from the environment.
//!
//! Required variables panic at startup with the variable name; everything else
//! falls back to a default.

use std::str::FromStr;

/// Read a required variable. Panics with the variable name when unset.
pub fn required(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| panic!("{key} must be set"))
}

pub fn optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable, falling back to `default` when unset or unparsable.
pub fn or_default<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// Comma-separated list; empty when unset.
pub fn list(key: &str) -> Vec<String> {
    std::env::var(key)
        .map(|v| split_list(&v))
        .unwrap_or_default()
}

pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_split_and_trim_entries() {
        assert_eq!(
            split_list(" a@x.com, b@y.com ,,"),
            vec!["a@x.com".to_owned(), "b@y.com".to_owned()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn should_fall_back_when_unset() {
        assert_eq!(or_default("HUB_CORE_TEST_UNSET_PORT", 3000u16), 3000);
        assert!(optional("HUB_CORE_TEST_UNSET_VALUE").is_none());
        assert!(list("HUB_CORE_TEST_UNSET_LIST").is_empty());
    }
}
