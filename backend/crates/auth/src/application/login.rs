//! Login Use Case
//!
//! Drives one login attempt: CSRF verification, the provider credential
//! check, and session creation. The attempt's progress is tracked with
//! the explicit [`AuthState`] union; nothing about the attempt survives
//! the request except the persisted session row.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::entity::session::Session;
use crate::domain::provider::{AuthChallenge, AuthOutcome, IdentityProvider};
use crate::domain::repository::SessionRepository;
use crate::domain::state::AuthState;
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub username: String,
    pub password: String,
    /// Token echoed in the request body
    pub csrf_token: String,
    /// Token from the csrf_token cookie, if any
    pub csrf_cookie: Option<String>,
}

/// Outcome of a login attempt that did not fail
#[derive(Debug)]
pub enum LoginOutcome {
    /// Session established
    Authenticated { session: Session },
    /// Success-in-progress: the provider demands an extra step
    ChallengeRequired { challenge: AuthChallenge },
}

/// Login use case
pub struct LoginUseCase<S, P>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    sessions: Arc<S>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<S, P> LoginUseCase<S, P>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutcome> {
        // CSRF comes first: a forged request must never reach the
        // provider.
        let cookie = input.csrf_cookie.as_deref().ok_or(AuthError::CsrfMissing)?;
        if input.csrf_token.is_empty() {
            return Err(AuthError::CsrfMissing);
        }
        if !platform::csrf::verify(&input.csrf_token, cookie) {
            return Err(AuthError::CsrfInvalid);
        }

        self.authenticate(&input.username, &input.password).await
    }

    /// Credential check without CSRF verification
    ///
    /// Used by `execute` after the CSRF gate, and by registration's
    /// immediate follow-up login (which has no CSRF round-trip of its
    /// own).
    pub(crate) async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<LoginOutcome> {
        let state = AuthState::Unauthenticated.begin(username)?;

        let outcome = match self.provider.authenticate(username, password).await {
            Ok(outcome) => outcome,
            Err(err) => {
                let state = state.fail();
                tracing::warn!(state = %state, "Authentication attempt failed");
                return Err(err.into());
            }
        };

        let state = state.apply_outcome(&outcome)?;

        match outcome {
            AuthOutcome::Challenge(challenge) => {
                tracing::info!(
                    challenge = %challenge.name,
                    state = %state,
                    "Provider demanded a challenge"
                );
                Ok(LoginOutcome::ChallengeRequired { challenge })
            }
            AuthOutcome::Resolved(resolved) => {
                let ttl = self.config.session_ttl(resolved.expires_in_secs);
                // The login identifier doubles as the account email in
                // this pool.
                let session = Session::new(username, username, resolved.tokens, ttl);
                self.sessions.create(&session).await?;

                tracing::info!(user_id = %username, state = %state, "User signed in");
                Ok(LoginOutcome::Authenticated { session })
            }
        }
    }
}
