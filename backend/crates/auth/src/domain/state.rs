//! Authentication State Machine
//!
//! Where a single login attempt stands, as an explicit tagged union
//! passed through the use cases — never ambient mutable state. Between
//! the login and challenge requests the state is carried by data handed
//! back to the client (username + provider session handle), so no
//! server instance needs client affinity.
//!
//! Transitions consume `self`; a state value cannot be replayed once a
//! transition has been applied.

use derive_more::Display;

use crate::domain::provider::{AuthOutcome, ChallengeName};
use crate::error::{AuthError, AuthResult};

/// State of one login attempt
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum AuthState {
    /// Idle, or a previous attempt failed
    #[display("Unauthenticated")]
    Unauthenticated,
    /// Credential check in flight
    #[display("Authenticating")]
    Authenticating { username: String },
    /// Provider demanded a forced password change
    #[display("NewPasswordRequired")]
    NewPasswordRequired {
        username: String,
        provider_session: String,
    },
    /// Terminal success
    #[display("Authenticated")]
    Authenticated { email: String },
}

impl AuthState {
    /// Start a credential check: `Unauthenticated -> Authenticating`
    pub fn begin(self, username: &str) -> AuthResult<AuthState> {
        match self {
            AuthState::Unauthenticated => Ok(AuthState::Authenticating {
                username: username.to_string(),
            }),
            other => Err(AuthError::InvalidState(describe(&other, "begin login"))),
        }
    }

    /// Apply the provider outcome: `Authenticating -> {Authenticated | NewPasswordRequired}`
    pub fn apply_outcome(self, outcome: &AuthOutcome) -> AuthResult<AuthState> {
        let username = match self {
            AuthState::Authenticating { username } => username,
            other => {
                return Err(AuthError::InvalidState(describe(
                    &other,
                    "apply an authentication outcome",
                )));
            }
        };

        match outcome {
            AuthOutcome::Resolved(_) => Ok(AuthState::Authenticated { email: username }),
            AuthOutcome::Challenge(challenge) => match &challenge.name {
                ChallengeName::NewPasswordRequired => Ok(AuthState::NewPasswordRequired {
                    username,
                    provider_session: challenge.provider_session.clone(),
                }),
                ChallengeName::Other(name) => {
                    Err(AuthError::UnsupportedChallenge(name.clone()))
                }
            },
        }
    }

    /// Rebuild a `NewPasswordRequired` state from client-supplied data
    ///
    /// This is how the challenge survives across requests: the handle
    /// travels to the client and back instead of living in server
    /// memory. Rejects unanswerable challenge names and empty handles
    /// before any provider call is made.
    pub fn resume_challenge(
        name: &ChallengeName,
        username: &str,
        provider_session: &str,
    ) -> AuthResult<AuthState> {
        match name {
            ChallengeName::Other(other) => Err(AuthError::UnsupportedChallenge(other.clone())),
            ChallengeName::NewPasswordRequired => {
                if username.is_empty() || provider_session.is_empty() {
                    return Err(AuthError::InvalidState(
                        "no pending challenge to respond to",
                    ));
                }
                Ok(AuthState::NewPasswordRequired {
                    username: username.to_string(),
                    provider_session: provider_session.to_string(),
                })
            }
        }
    }

    /// Finish a challenge: `NewPasswordRequired -> Authenticated`
    pub fn complete_challenge(self, email: &str) -> AuthResult<AuthState> {
        match self {
            AuthState::NewPasswordRequired { .. } => Ok(AuthState::Authenticated {
                email: email.to_string(),
            }),
            other => Err(AuthError::InvalidState(describe(
                &other,
                "complete a challenge",
            ))),
        }
    }

    /// Any state falls back to `Unauthenticated` on failure
    pub fn fail(self) -> AuthState {
        AuthState::Unauthenticated
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthState::Authenticated { .. })
    }
}

fn describe(state: &AuthState, attempted: &str) -> &'static str {
    // The static message keeps internals out of responses; the detail
    // goes to the log at the call site.
    tracing::debug!(state = %state, attempted, "Illegal auth state transition");
    "operation not valid in the current authentication state"
}
