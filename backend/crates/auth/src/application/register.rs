//! Register Use Case
//!
//! Creates a provider-side account and immediately signs it in, so
//! registration always ends either authenticated or with a clearly
//! reported login failure.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::login::{LoginOutcome, LoginUseCase};
use crate::domain::entity::session::Session;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: String,
}

/// Register output
#[derive(Debug)]
pub struct RegisterOutput {
    /// Provider-assigned user identifier
    pub user_sub: String,
    /// Session from the immediate follow-up login
    pub session: Session,
}

/// Register use case
pub struct RegisterUseCase<S, P>
where
    S: SessionRepository,
    P: IdentityProvider,
{
    sessions: Arc<S>,
    provider: Arc<P>,
    config: Arc<AuthConfig>,
}

impl<S, P> RegisterUseCase<S, P>
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

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<RegisterOutput> {
        // Obviously malformed email never reaches the provider.
        let email = Email::new(&input.email).map_err(|e| {
            tracing::debug!(error = %e, "Rejected registration email");
            AuthError::InvalidParameter
        })?;

        let registered = self
            .provider
            .register(&input.username, &input.password, email.as_str())
            .await?;

        tracing::info!(user_sub = %registered.user_sub, "User registered");

        // Establish a session with the same credentials right away. No
        // CSRF round-trip exists for this inner login; the register
        // request itself was the state-changing call.
        let login = LoginUseCase::new(
            self.sessions.clone(),
            self.provider.clone(),
            self.config.clone(),
        );

        match login.authenticate(&input.username, &input.password).await? {
            LoginOutcome::Authenticated { session } => Ok(RegisterOutput {
                user_sub: registered.user_sub,
                session,
            }),
            LoginOutcome::ChallengeRequired { challenge } => {
                // A freshly registered account has a permanent password;
                // a challenge here means the pool is misconfigured.
                tracing::error!(
                    challenge = %challenge.name,
                    "Provider demanded a challenge right after registration"
                );
                Err(AuthError::Internal(
                    "registration login did not resolve".to_string(),
                ))
            }
        }
    }
}
