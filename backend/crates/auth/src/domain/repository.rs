//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::entity::session::Session;
use crate::error::AuthResult;

/// Session repository trait
///
/// The session store is the only shared mutable resource in the system.
/// Storage-layer failures propagate as errors; the caller must treat
/// them as a hard failure of the operation in flight.
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Persist a new session
    ///
    /// The token is the primary key; inserting a colliding token must
    /// fail, never overwrite an existing row.
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find a session by token
    ///
    /// Returns `None` for unknown tokens and for rows whose expiry has
    /// passed, whether or not the sweep has removed them yet.
    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Delete a session
    ///
    /// Returns whether a row was actually removed. Deleting an unknown
    /// token is not an error.
    async fn delete(&self, token: &str) -> AuthResult<bool>;

    /// Remove all expired rows, returning the count
    async fn cleanup_expired(&self) -> AuthResult<u64>;
}
