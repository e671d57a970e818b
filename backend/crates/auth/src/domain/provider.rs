//! Identity Provider Boundary
//!
//! The hosted user pool is a remote black box reached through a handful
//! of operations. This module defines the normalized result types and
//! the [`IdentityProvider`] trait; the wire protocol lives in the
//! infrastructure layer.
//!
//! Authentication either resolves to a token bundle or demands a named
//! challenge — the two cases are a discriminated union, never inferred
//! from ad hoc fields.

use std::collections::HashMap;
use std::fmt;

use derive_more::Display;
use thiserror::Error;

/// Token bundle issued by the provider on successful authentication
///
/// The tokens are opaque blobs to this system; they are stored with the
/// session and never inspected.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderTokenSet {
    pub access_token: String,
    pub id_token: String,
    pub refresh_token: String,
}

// Bearer material; keep it out of debug output.
impl fmt::Debug for ProviderTokenSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTokenSet")
            .field("access_token", &"[REDACTED]")
            .field("id_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Fully resolved authentication result
#[derive(Debug, Clone)]
pub struct ResolvedAuth {
    pub tokens: ProviderTokenSet,
    /// Provider-reported validity of the token bundle, in seconds
    pub expires_in_secs: Option<u32>,
}

/// Name of a provider-demanded challenge
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ChallengeName {
    /// Forced password change before a session can be established
    #[display("NEW_PASSWORD_REQUIRED")]
    NewPasswordRequired,
    /// Any challenge this gateway does not answer
    #[display("{_0}")]
    Other(String),
}

impl ChallengeName {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "NEW_PASSWORD_REQUIRED" => ChallengeName::NewPasswordRequired,
            other => ChallengeName::Other(other.to_string()),
        }
    }
}

/// A challenge returned instead of a resolved result
#[derive(Debug, Clone)]
pub struct AuthChallenge {
    pub name: ChallengeName,
    /// Opaque continuation handle; required to answer the challenge
    pub provider_session: String,
    pub params: HashMap<String, String>,
}

/// Discriminated outcome of an authentication attempt
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Resolved(ResolvedAuth),
    Challenge(AuthChallenge),
}

/// Client-supplied data answering a challenge
#[derive(Debug, Clone)]
pub struct ChallengeAnswer {
    pub username: String,
    pub provider_session: String,
    pub new_password: String,
}

/// Provider-side account created by registration
#[derive(Debug, Clone)]
pub struct RegisteredUser {
    /// Stable provider-assigned user identifier
    pub user_sub: String,
}

/// Normalized provider failures
///
/// Provider exception names are mapped into this taxonomy at the adapter
/// boundary; nothing above it ever sees a raw provider error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// Wrong password (or otherwise not authorized)
    #[error("Provider rejected the credentials")]
    BadCredentials,

    /// The account does not exist
    ///
    /// Collapsed with [`ProviderError::BadCredentials`] in user-facing
    /// mappings; kept distinct here for the password-reset
    /// anti-enumeration path.
    #[error("Provider does not know the user")]
    UserNotFound,

    /// The account exists but was never confirmed
    #[error("Account is not verified")]
    AccountNotVerified,

    /// The provider demands a password reset before login
    #[error("Password reset required")]
    ResetRequired,

    /// The provider throttled the request
    #[error("Rate limited by the provider")]
    RateLimited,

    /// Request parameters failed provider-side validation
    #[error("Invalid request parameters")]
    InvalidParameter,

    /// The password does not satisfy the pool's policy
    #[error("Password does not meet the policy")]
    PasswordPolicy,

    /// Registration hit an existing account
    #[error("Account already exists")]
    UserExists,

    /// Password-reset confirmation code did not match
    #[error("Confirmation code mismatch")]
    CodeMismatch,

    /// Password-reset confirmation code expired
    #[error("Confirmation code expired")]
    CodeExpired,

    /// A challenge this gateway does not know how to answer
    #[error("Unsupported challenge type: {0}")]
    UnsupportedChallenge(String),

    /// Transport or configuration failure (includes timeouts)
    #[error("Identity provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered with something this adapter cannot read
    #[error("Unexpected provider response: {0}")]
    Protocol(String),
}

/// Identity provider operations
///
/// All operations are remote calls that may fail or time out; a bounded
/// timeout surfaces as [`ProviderError::Unavailable`], never as a
/// credential failure.
#[trait_variant::make(IdentityProvider: Send)]
pub trait LocalIdentityProvider {
    /// Password check; may resolve or demand a challenge
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome, ProviderError>;

    /// Answer a previously issued challenge
    ///
    /// Only [`ChallengeName::NewPasswordRequired`] is answerable; any
    /// other name fails with [`ProviderError::UnsupportedChallenge`]
    /// without a remote call.
    async fn respond_to_challenge(
        &self,
        challenge: &ChallengeName,
        answer: &ChallengeAnswer,
    ) -> Result<ResolvedAuth, ProviderError>;

    /// Create a provider-side account
    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<RegisteredUser, ProviderError>;

    /// Start a password reset (code delivery is the provider's job)
    ///
    /// Unknown accounts report success — existence must not be
    /// observable through this operation. Rate limiting is the one
    /// failure reported distinctly.
    async fn initiate_password_reset(&self, username: &str) -> Result<(), ProviderError>;

    /// Finish a password reset with the delivered code
    async fn confirm_password_reset(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ProviderError>;
}
