//! Session Entity
//!
//! Represents an authenticated principal's right to act without
//! re-presenting credentials. Stored server-side, keyed solely by the
//! opaque token.

use chrono::{DateTime, Duration, Utc};

use crate::domain::provider::ProviderTokenSet;
use crate::domain::value_object::session_token::SessionToken;

/// Session entity
///
/// A session is either absent or valid until expiry; there are no
/// partial states. Records are created and deleted whole — never
/// mutated in place.
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque token; the sole lookup key
    pub token: SessionToken,
    /// Provider-side user identifier
    pub user_id: String,
    /// Email associated with the account
    pub email: String,
    /// Provider token bundle (opaque blobs)
    pub provider_tokens: ProviderTokenSet,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Session expiration (Unix timestamp ms)
    pub expires_at_ms: i64,
}

impl Session {
    /// Create a new session record with a freshly generated token
    ///
    /// TTL is provided by the application layer (config or the
    /// provider's `expires_in`), not hard-coded here.
    pub fn new(
        user_id: impl Into<String>,
        email: impl Into<String>,
        provider_tokens: ProviderTokenSet,
        ttl: Duration,
    ) -> Self {
        let now = Utc::now();

        Self {
            token: SessionToken::generate(),
            user_id: user_id.into(),
            email: email.into(),
            provider_tokens,
            created_at: now,
            expires_at_ms: (now + ttl).timestamp_millis(),
        }
    }

    /// Check if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp_millis() > self.expires_at_ms
    }

    /// Created timestamp (Unix timestamp ms), for API responses
    pub fn created_at_ms(&self) -> i64 {
        self.created_at.timestamp_millis()
    }
}
