//! Email Value Object

use std::fmt;

use thiserror::Error;

/// Maximum accepted length (RFC 5321 forward-path limit)
const MAX_EMAIL_LENGTH: usize = 254;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailError {
    #[error("Email cannot be empty")]
    Empty,

    #[error("Email must be at most {MAX_EMAIL_LENGTH} characters")]
    TooLong,

    #[error("Email format is invalid")]
    InvalidFormat,
}

/// Validated email address
///
/// Validation is intentionally shallow: the identity provider is the
/// authority on deliverability, this type only rejects obviously
/// malformed input before a remote call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Email(String);

impl Email {
    pub fn new(raw: impl Into<String>) -> Result<Self, EmailError> {
        let value = raw.into();
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(EmailError::Empty);
        }
        if trimmed.len() > MAX_EMAIL_LENGTH {
            return Err(EmailError::TooLong);
        }

        // local@domain with a dot in the domain part
        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(EmailError::InvalidFormat);
        };
        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(EmailError::InvalidFormat);
        }
        if trimmed.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(EmailError::InvalidFormat);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        let email = Email::new("carol@example.com").unwrap();
        assert_eq!(email.as_str(), "carol@example.com");
    }

    #[test]
    fn test_trims_whitespace() {
        let email = Email::new("  carol@example.com ").unwrap();
        assert_eq!(email.as_str(), "carol@example.com");
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(Email::new(""), Err(EmailError::Empty));
        assert_eq!(Email::new("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_rejects_malformed() {
        assert_eq!(Email::new("no-at-sign"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("@example.com"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("carol@"), Err(EmailError::InvalidFormat));
        assert_eq!(Email::new("carol@localhost"), Err(EmailError::InvalidFormat));
        assert_eq!(
            Email::new("carol smith@example.com"),
            Err(EmailError::InvalidFormat)
        );
    }

    #[test]
    fn test_rejects_too_long() {
        let long = format!("{}@example.com", "a".repeat(MAX_EMAIL_LENGTH));
        assert_eq!(Email::new(long), Err(EmailError::TooLong));
    }
}
