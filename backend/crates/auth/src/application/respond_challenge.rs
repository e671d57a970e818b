//! Respond To Challenge Use Case
//!
//! Completes the forced-password-change step of a login attempt. The
//! pending state is rebuilt from client-supplied data (username +
//! provider session handle), so the call works on any server instance.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::provider::{ChallengeAnswer, ChallengeName, IdentityProvider};
use crate::domain::repository::SessionRepository;
use crate::domain::state::AuthState;
use crate::error::{AuthError, AuthResult};

/// Challenge response input
pub struct ChallengeInput {
    /// Challenge name as reported back by the client
    pub challenge_name: String,
    pub username: String,
    /// Provider continuation handle from the login response
    pub provider_session: String,
    pub new_password: Option<String>,
}

/// Respond-to-challenge use case
pub struct RespondChallengeUseCase<S, P>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    sessions: Arc<S>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<S, P> RespondChallengeUseCase<S, P>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    pub fn new(sessions: Arc<S>, provider: Arc<P>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions,
            provider,
            config,
        }
    }

    pub async fn execute(&self, input: ChallengeInput) -> AuthResult<Session> {
        let name = ChallengeName::parse(&input.challenge_name);

        // Rejects unanswerable names and requests that cannot resume a
        // pending challenge — no provider call is made in those cases.
        let state =
            AuthState::resume_challenge(&name, &input.username, &input.provider_session)?;

        let new_password = input
            .new_password
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(AuthError::MissingField("newPassword"))?;

        let answer = ChallengeAnswer {
            username: input.username.clone(),
            provider_session: input.provider_session.clone(),
            new_password: new_password.to_string(),
        };

        let resolved = match self.provider.respond_to_challenge(&name, &answer).await {
            Ok(resolved) => resolved,
            Err(err) => {
                let state = state.fail();
                tracing::warn!(state = %state, "Challenge response failed");
                return Err(err.into());
            }
        };

        let state = state.complete_challenge(&input.username)?;

        let ttl = self.config.session_ttl(resolved.expires_in_secs);
        let session = Session::new(&input.username, &input.username, resolved.tokens, ttl);
        self.sessions.create(&session).await?;

        tracing::info!(user_id = %input.username, state = %state, "Challenge completed");
        Ok(session)
    }
}
