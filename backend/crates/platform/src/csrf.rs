//! CSRF Token Guard
//!
//! Stateless anti-forgery tokens for state-mutating authentication
//! requests. A token is issued via a protected cookie and must be echoed
//! back in the request body; the server revalidates by comparing the two
//! values, so no server-side storage is involved.

use crate::crypto::{constant_time_eq, random_token};

/// Entropy of an issued token in bytes (128 bits)
const CSRF_TOKEN_BYTES: usize = 16;

/// Generate a fresh CSRF token
///
/// The token is bound to one login attempt: it is set as an HttpOnly,
/// SameSite cookie and simultaneously returned in the response body so
/// the client can echo it.
pub fn issue() -> String {
    random_token(CSRF_TOKEN_BYTES)
}

/// Verify an echoed CSRF token against the cookie value
///
/// True iff both values are present, non-empty and equal. Comparison is
/// constant-time so the check cannot be used as a timing oracle.
pub fn verify(supplied: &str, cookie: &str) -> bool {
    if supplied.is_empty() || cookie.is_empty() {
        return false;
    }
    constant_time_eq(supplied.as_bytes(), cookie.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_length_and_uniqueness() {
        let token = issue();
        // 16 bytes -> 22 base64url chars
        assert_eq!(token.len(), 22);
        assert_ne!(issue(), issue());
    }

    #[test]
    fn test_verify_matching_token() {
        let token = issue();
        assert!(verify(&token, &token));
    }

    #[test]
    fn test_verify_rejects_tampered_token() {
        let token = issue();
        let mut tampered = token.clone();
        // flip the last character
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert!(!verify(&tampered, &token));
    }

    #[test]
    fn test_verify_rejects_empty_values() {
        let token = issue();
        assert!(!verify("", &token));
        assert!(!verify(&token, ""));
        assert!(!verify("", ""));
    }

    #[test]
    fn test_verify_rejects_different_issue() {
        // a token from another attempt never matches
        assert!(!verify(&issue(), &issue()));
    }
}
