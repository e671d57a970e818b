//! Logout Use Case
//!
//! Ends a session. Best-effort: deleting an unknown or already-deleted
//! token is not an error.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    sessions: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Delete the session row; returns whether one existed
    pub async fn execute(&self, token: &str) -> AuthResult<bool> {
        let removed = self.sessions.delete(token).await?;

        if removed {
            tracing::info!("User signed out");
        } else {
            tracing::debug!("Logout for unknown or already-ended session");
        }

        Ok(removed)
    }
}
