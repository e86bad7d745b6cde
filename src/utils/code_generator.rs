//! Short code generation and input validation.
//!
//! Random codes are not unique by construction; callers insert them and rely
//! on the store's uniqueness constraint, drawing again on conflict.

use rand::Rng;
use rand::distr::Alphanumeric;
use regex::Regex;
use std::sync::LazyLock;

/// Length of generated codes. 62^6 ≈ 5.6×10^10 possible values.
pub const RANDOM_CODE_LENGTH: usize = 6;

/// Codes that would be shadowed by fixed routes.
pub const RESERVED_CODES: &[&str] = &["api", "health", "redirect"];

static CUSTOM_CODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{3,20}$").expect("valid custom code regex"));

static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://\S+$").expect("valid url regex"));

/// Draws a 6-character code uniformly from `[a-zA-Z0-9]`.
///
/// # Examples
///
/// ```ignore
/// let code = generate_random_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_random_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Accepts 3-20 characters from `[a-zA-Z0-9_-]`.
pub fn validate_custom_code(code: &str) -> bool {
    CUSTOM_CODE_REGEX.is_match(code)
}

/// Accepts `http://` or `https://` followed by at least one non-whitespace
/// character and no whitespace anywhere.
pub fn validate_url(value: &str) -> bool {
    URL_REGEX.is_match(value)
}

/// Returns true if the code collides with a fixed route.
pub fn is_reserved_code(code: &str) -> bool {
    RESERVED_CODES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(code))
}

/// Returns the first code from `draw` that is not reserved.
///
/// A reserved random code would be shadowed by its fixed route on
/// `GET /{code}`, so it is discarded rather than inserted.
pub fn first_unreserved(mut draw: impl FnMut() -> String) -> String {
    loop {
        let code = draw();
        if !is_reserved_code(&code) {
            return code;
        }
    }
}
