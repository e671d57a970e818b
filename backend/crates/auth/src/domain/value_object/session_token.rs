//! Session Token Value Object
//!
//! Opaque, high-entropy identifier for an established session. The token
//! is the sole lookup key for session records and is only ever handed to
//! the client once, at creation time.

use std::fmt;

use platform::crypto::random_token;

/// Entropy of a generated token in bytes (256 bits)
const TOKEN_BYTES: usize = 32;

/// Encoded token length (32 bytes, base64url, no padding)
pub const TOKEN_LEN: usize = 43;

/// Opaque session token
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SessionToken(String);

impl SessionToken {
    /// Generate a fresh token from the OS CSPRNG
    ///
    /// Guessing resistance comes from entropy alone; tokens carry no
    /// structure and are never derived from user data.
    pub fn generate() -> Self {
        Self(random_token(TOKEN_BYTES))
    }

    /// Reconstruct a token read back from storage
    pub(crate) fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

// Tokens are secrets; keep them out of debug output.
impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionToken").field(&"[REDACTED]").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_token_shape() {
        let token = SessionToken::generate();
        assert_eq!(token.as_str().len(), TOKEN_LEN);
        assert!(
            token
                .as_str()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_generated_tokens_are_unique() {
        let a = SessionToken::generate();
        let b = SessionToken::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn test_debug_is_redacted() {
        let token = SessionToken::generate();
        let debug = format!("{:?}", token);
        assert!(!debug.contains(token.as_str()));
        assert!(debug.contains("REDACTED"));
    }
}
