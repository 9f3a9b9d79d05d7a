//! Bearer-encoded password extraction (§6, testable property 8).
//!
//! `Authorization: Bearer <b64url(password)>`, matched case-insensitively on
//! the scheme keyword. A header that does not match the shape, or whose body
//! is not valid base64, yields an empty candidate rather than an error — an
//! absent or malformed header is indistinguishable from "no password
//! supplied" at this layer; the Secret Context is what decides whether an
//! empty candidate is acceptable.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};

/// Extract the candidate password from a raw `Authorization` header value.
///
/// Matches `(?i)^Bearer\s+[A-Za-z0-9=+/_-]+$` against the header value; a
/// non-matching shape or invalid base64 body both yield an empty string.
pub fn candidate_password(header_value: Option<&str>) -> String {
    let Some(value) = header_value else {
        return String::new();
    };

    let Some(rest) = strip_bearer_prefix(value) else {
        return String::new();
    };

    if rest.is_empty() || !rest.bytes().all(is_token_char) {
        return String::new();
    }

    URL_SAFE_NO_PAD
        .decode(rest)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

fn strip_bearer_prefix(value: &str) -> Option<&str> {
    let value = value.trim_start();
    if !value.is_char_boundary(6) || value.len() < 7 {
        return None;
    }
    let (scheme, rest) = value.split_at(6);
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    Some(rest.trim_start_matches(char::is_whitespace))
}

fn is_token_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'=' | b'+' | b'/' | b'_' | b'-')
}

#[cfg(test)]
#[path = "auth_tests.rs"]
mod tests;
