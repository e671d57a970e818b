//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system. The user-facing
//! message for every variant is stable and never leaks whether an
//! account exists or what the provider actually said; full detail stays
//! in the server log.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::provider::ProviderError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// CSRF token absent from the request or cookie
    #[error("CSRF token required")]
    CsrfMissing,

    /// CSRF token present but did not match the cookie
    #[error("Invalid CSRF token")]
    CsrfInvalid,

    /// Wrong password or unknown user — deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account exists but was never verified
    #[error("Account not verified")]
    AccountNotVerified,

    /// Provider demands a password reset before login
    #[error("Password reset required")]
    ResetRequired,

    /// Provider throttled the request
    #[error("Too many attempts")]
    RateLimited,

    /// Request failed provider-side validation
    #[error("Invalid parameters")]
    InvalidParameter,

    /// Password rejected by the pool's policy
    #[error("Password does not meet requirements")]
    PasswordPolicy,

    /// Registration hit an existing account
    #[error("Account already exists")]
    UserExists,

    /// Password-reset confirmation code mismatch
    #[error("Invalid confirmation code")]
    CodeMismatch,

    /// Password-reset confirmation code expired
    #[error("Confirmation code expired")]
    CodeExpired,

    /// A challenge this gateway cannot answer
    #[error("Unsupported challenge type: {0}")]
    UnsupportedChallenge(String),

    /// Operation not valid for the attempt's current state
    #[error("Invalid authentication state: {0}")]
    InvalidState(&'static str),

    /// Session not found or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Required request field missing
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Provider transport/configuration failure (includes timeouts)
    #[error("Identity provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider answered with something this gateway cannot read
    #[error("Unexpected provider response: {0}")]
    ProviderProtocol(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::CsrfMissing | AuthError::CsrfInvalid => StatusCode::FORBIDDEN,
            AuthError::InvalidCredentials
            | AuthError::AccountNotVerified
            | AuthError::ResetRequired
            | AuthError::SessionInvalid => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AuthError::InvalidParameter
            | AuthError::PasswordPolicy
            | AuthError::CodeMismatch
            | AuthError::CodeExpired
            | AuthError::UnsupportedChallenge(_)
            | AuthError::InvalidState(_)
            | AuthError::MissingField(_) => StatusCode::BAD_REQUEST,
            AuthError::UserExists => StatusCode::CONFLICT,
            AuthError::ProviderUnavailable(_)
            | AuthError::ProviderProtocol(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::CsrfMissing | AuthError::CsrfInvalid => ErrorKind::Forbidden,
            AuthError::InvalidCredentials
            | AuthError::AccountNotVerified
            | AuthError::ResetRequired
            | AuthError::SessionInvalid => ErrorKind::Unauthorized,
            AuthError::RateLimited => ErrorKind::TooManyRequests,
            AuthError::InvalidParameter
            | AuthError::PasswordPolicy
            | AuthError::CodeMismatch
            | AuthError::CodeExpired
            | AuthError::UnsupportedChallenge(_)
            | AuthError::InvalidState(_)
            | AuthError::MissingField(_) => ErrorKind::BadRequest,
            AuthError::UserExists => ErrorKind::Conflict,
            AuthError::ProviderUnavailable(_)
            | AuthError::ProviderProtocol(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Stable user-facing message
    ///
    /// Unknown-user and wrong-password share one message by design, and
    /// provider/infrastructure failures collapse into a generic one.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::CsrfMissing => "CSRF token required",
            AuthError::CsrfInvalid => "Invalid CSRF token",
            AuthError::InvalidCredentials => "Incorrect username or password. Please try again.",
            AuthError::AccountNotVerified => {
                "Account not verified. Please check your email for verification instructions."
            }
            AuthError::ResetRequired => {
                "Password reset required. Please use the \"Forgot password?\" option."
            }
            AuthError::RateLimited => "Too many attempts. Please try again later.",
            AuthError::InvalidParameter => {
                "Invalid parameters. Please check your input and try again."
            }
            AuthError::PasswordPolicy => {
                "Password does not meet requirements. Please choose a stronger password."
            }
            AuthError::UserExists => "An account with this email already exists.",
            AuthError::CodeMismatch => "Invalid verification code. Please try again.",
            AuthError::CodeExpired => {
                "Verification code has expired. Please request a new code."
            }
            AuthError::UnsupportedChallenge(_) => "Unsupported authentication challenge.",
            AuthError::InvalidState(_) => "Request is not valid for the current login state.",
            AuthError::SessionInvalid => "Session not found or expired",
            AuthError::MissingField(_) => "Required parameters are missing.",
            AuthError::ProviderUnavailable(_)
            | AuthError::ProviderProtocol(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => {
                "Authentication failed. Please try again or contact support."
            }
        }
    }

    /// Machine-readable code where clients need to branch
    fn code(&self) -> Option<&'static str> {
        match self {
            AuthError::CsrfMissing => Some("MISSING_CSRF"),
            AuthError::CsrfInvalid => Some("INVALID_CSRF"),
            _ => None,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        let err = AppError::new(self.kind(), self.user_message());
        match self.code() {
            Some(code) => err.with_code(code),
            None => err,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::ProviderUnavailable(detail) => {
                tracing::error!(detail = %detail, "Identity provider unavailable");
            }
            AuthError::ProviderProtocol(detail) => {
                tracing::error!(detail = %detail, "Unexpected identity provider response");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::CsrfMissing | AuthError::CsrfInvalid => {
                tracing::warn!(error = %self, "CSRF verification failed");
            }
            AuthError::RateLimited => {
                tracing::warn!("Provider rate limit hit");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        match err {
            // Unknown user folds into bad credentials: enumeration
            // resistance requires the two to be indistinguishable.
            ProviderError::BadCredentials | ProviderError::UserNotFound => {
                AuthError::InvalidCredentials
            }
            ProviderError::AccountNotVerified => AuthError::AccountNotVerified,
            ProviderError::ResetRequired => AuthError::ResetRequired,
            ProviderError::RateLimited => AuthError::RateLimited,
            ProviderError::InvalidParameter => AuthError::InvalidParameter,
            ProviderError::PasswordPolicy => AuthError::PasswordPolicy,
            ProviderError::UserExists => AuthError::UserExists,
            ProviderError::CodeMismatch => AuthError::CodeMismatch,
            ProviderError::CodeExpired => AuthError::CodeExpired,
            ProviderError::UnsupportedChallenge(name) => AuthError::UnsupportedChallenge(name),
            ProviderError::Unavailable(detail) => AuthError::ProviderUnavailable(detail),
            ProviderError::Protocol(detail) => AuthError::ProviderProtocol(detail),
        }
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_user_and_bad_password_are_identical() {
        let unknown: AuthError = ProviderError::UserNotFound.into();
        let wrong: AuthError = ProviderError::BadCredentials.into();

        assert_eq!(unknown.status_code(), wrong.status_code());
        assert_eq!(unknown.user_message(), wrong.user_message());
        assert_eq!(unknown.kind(), wrong.kind());
    }

    #[test]
    fn test_transport_failure_is_not_a_credential_failure() {
        let err: AuthError = ProviderError::Unavailable("connect timeout".to_string()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_ne!(
            err.user_message(),
            AuthError::InvalidCredentials.user_message()
        );
    }

    #[test]
    fn test_provider_error_mappings() {
        let cases = [
            (ProviderError::AccountNotVerified, StatusCode::UNAUTHORIZED),
            (ProviderError::ResetRequired, StatusCode::UNAUTHORIZED),
            (ProviderError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ProviderError::InvalidParameter, StatusCode::BAD_REQUEST),
            (ProviderError::PasswordPolicy, StatusCode::BAD_REQUEST),
            (ProviderError::UserExists, StatusCode::CONFLICT),
            (ProviderError::CodeMismatch, StatusCode::BAD_REQUEST),
            (ProviderError::CodeExpired, StatusCode::BAD_REQUEST),
        ];

        for (provider_err, expected) in cases {
            let err: AuthError = provider_err.into();
            assert_eq!(err.status_code(), expected);
        }
    }

    #[test]
    fn test_csrf_errors_carry_machine_codes() {
        assert_eq!(AuthError::CsrfMissing.to_app_error().code(), "MISSING_CSRF");
        assert_eq!(AuthError::CsrfInvalid.to_app_error().code(), "INVALID_CSRF");
        assert_eq!(
            AuthError::CsrfInvalid.status_code(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_server_errors_hide_detail() {
        let err = AuthError::ProviderProtocol("stack trace and ids".to_string());
        assert!(!err.to_app_error().message().contains("stack trace"));
    }
}
