//! Machine-readable error codes shared by every hydra crate.
//!
//! Each layer defines its own `thiserror` enum and implements
//! [`ErrorCode`] on it. The outer request surface serializes
//! `code()` next to the message so that UI callers can branch on
//! a stable string instead of parsing text.
//!
//! # Example
//!
//! ```
//! use hydra_types::ErrorCode;
//!
//! #[derive(Debug)]
//! enum CloneError {
//!     Unreachable,
//!     InvalidUrl(String),
//! }
//!
//! impl ErrorCode for CloneError {
//!     fn code(&self) -> &'static str {
//!         match self {
//!             Self::Unreachable => "CLONE_UNREACHABLE",
//!             Self::InvalidUrl(_) => "CLONE_INVALID_URL",
//!         }
//!     }
//!
//!     fn is_recoverable(&self) -> bool {
//!         matches!(self, Self::Unreachable)
//!     }
//! }
//!
//! assert_eq!(CloneError::Unreachable.code(), "CLONE_UNREACHABLE");
//! assert!(!CloneError::InvalidUrl("x".into()).is_recoverable());
//! ```

/// Stable error code interface.
///
/// # Code Format
///
/// - UPPER_SNAKE_CASE
/// - Prefixed with the owning layer (`HOOK_`, `DISPATCH_`, `CONFIG_`, `WORKSPACE_`)
/// - Never renamed once published: callers match on it
pub trait ErrorCode {
    /// Returns the machine-readable code.
    fn code(&self) -> &'static str;

    /// Returns `true` if issuing the same intent again may succeed.
    ///
    /// The engine never retries by itself; this is advice for whoever
    /// issued the intent.
    fn is_recoverable(&self) -> bool;
}

/// Asserts that an error code is non-empty, prefixed and UPPER_SNAKE_CASE.
///
/// # Panics
///
/// Panics with a descriptive message if any check fails.
pub fn assert_error_code<E: ErrorCode>(err: &E, expected_prefix: &str) {
    let code = err.code();

    assert!(!code.is_empty(), "Error code must not be empty");
    assert!(
        code.starts_with(expected_prefix),
        "Error code '{}' must start with prefix '{}'",
        code,
        expected_prefix
    );
    assert!(
        is_upper_snake_case(code),
        "Error code '{}' must be UPPER_SNAKE_CASE",
        code
    );
}

/// Runs [`assert_error_code`] over every variant in `errors`.
///
/// # Panics
///
/// Panics on the first invalid code.
pub fn assert_error_codes<E: ErrorCode>(errors: &[E], expected_prefix: &str) {
    for err in errors {
        assert_error_code(err, expected_prefix);
    }
}

fn is_upper_snake_case(s: &str) -> bool {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return false;
    }
    s.chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    enum SampleError {
        Busy,
        Missing,
    }

    impl ErrorCode for SampleError {
        fn code(&self) -> &'static str {
            match self {
                Self::Busy => "SAMPLE_BUSY",
                Self::Missing => "SAMPLE_MISSING",
            }
        }

        fn is_recoverable(&self) -> bool {
            matches!(self, Self::Busy)
        }
    }

    #[test]
    fn codes_and_recoverability() {
        assert_eq!(SampleError::Busy.code(), "SAMPLE_BUSY");
        assert!(SampleError::Busy.is_recoverable());
        assert!(!SampleError::Missing.is_recoverable());
    }

    #[test]
    fn all_variants_pass_format_check() {
        assert_error_codes(&[SampleError::Busy, SampleError::Missing], "SAMPLE_");
    }

    #[test]
    #[should_panic(expected = "must start with prefix")]
    fn wrong_prefix_panics() {
        assert_error_code(&SampleError::Busy, "HOOK_");
    }

    #[test]
    fn snake_case_rules() {
        assert!(is_upper_snake_case("DISPATCH_UNKNOWN_INTENT"));
        assert!(is_upper_snake_case("HOOK_2"));
        assert!(!is_upper_snake_case(""));
        assert!(!is_upper_snake_case("hook_failed"));
        assert!(!is_upper_snake_case("_HOOK"));
        assert!(!is_upper_snake_case("HOOK_"));
        assert!(!is_upper_snake_case("HOOK__FAILED"));
    }
}
