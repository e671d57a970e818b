//! Verify Session Use Case
//!
//! The operation the HTTP boundary calls on every protected request and
//! on page load to restore client state.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

/// Session info output (non-sensitive)
#[derive(Debug)]
pub struct SessionInfoOutput {
    pub user_id: String,
    pub email: String,
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
}

/// Verify session use case
pub struct VerifySessionUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
}

impl<S> VerifySessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Check a session token and return the associated identity
    ///
    /// Absent and expired sessions are indistinguishable to the caller.
    pub async fn execute(&self, token: &str) -> AuthResult<SessionInfoOutput> {
        let session = self
            .sessions
            .find_by_token(token)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        Ok(SessionInfoOutput {
            user_id: session.user_id,
            email: session.email,
            created_at_ms: session.created_at.timestamp_millis(),
            expires_at_ms: session.expires_at_ms,
        })
    }
}
