//! In-Memory Session Store
//!
//! Same contract as the PostgreSQL store, backed by a process-local
//! map. Used by tests and for running the gateway without a database.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

/// Process-local session store
#[derive(Clone, Default)]
pub struct MemorySessionStore {
    inner: Arc<RwLock<HashMap<String, Session>>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently held, including expired-but-unswept ones
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

impl SessionRepository for MemorySessionStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        let mut map = self.inner.write().await;

        // Mirror the database primary key: reject, never overwrite.
        if map.contains_key(session.token.as_str()) {
            return Err(AuthError::Internal("duplicate session token".to_string()));
        }

        map.insert(session.token.as_str().to_string(), session.clone());
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>> {
        let map = self.inner.read().await;

        // Lazy expiry: an expired row behaves as not-found even before
        // the sweep removes it.
        Ok(map.get(token).filter(|s| !s.is_expired()).cloned())
    }

    async fn delete(&self, token: &str) -> AuthResult<bool> {
        let mut map = self.inner.write().await;
        Ok(map.remove(token).is_some())
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();
        let mut map = self.inner.write().await;

        let before = map.len();
        map.retain(|_, session| session.expires_at_ms > now_ms);
        let deleted = (before - map.len()) as u64;

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::provider::ProviderTokenSet;
    use chrono::Duration;

    fn session(ttl_secs: i64) -> Session {
        Session::new(
            "alice",
            "alice@example.com",
            ProviderTokenSet {
                access_token: "access".to_string(),
                id_token: "id".to_string(),
                refresh_token: "refresh".to_string(),
            },
            Duration::seconds(ttl_secs),
        )
    }

    #[tokio::test]
    async fn test_get_after_create_returns_the_record() {
        let store = MemorySessionStore::new();
        let session = session(1200);
        store.create(&session).await.unwrap();

        let found = store
            .find_by_token(session.token.as_str())
            .await
            .unwrap()
            .expect("session should be found");

        assert_eq!(found.user_id, "alice");
        assert_eq!(found.expires_at_ms, session.expires_at_ms);
        assert_eq!(
            found.expires_at_ms - found.created_at.timestamp_millis(),
            1200 * 1000
        );
    }

    #[tokio::test]
    async fn test_duplicate_token_is_rejected() {
        let store = MemorySessionStore::new();
        let session = session(1200);
        store.create(&session).await.unwrap();

        let err = store.create(&session).await.unwrap_err();
        assert!(matches!(err, AuthError::Internal(_)));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_row_behaves_as_not_found_before_sweep() {
        let store = MemorySessionStore::new();
        let expired = session(-10);
        store.create(&expired).await.unwrap();

        // The row is physically present but must not be served.
        assert_eq!(store.len().await, 1);
        assert!(
            store
                .find_by_token(expired.token.as_str())
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemorySessionStore::new();
        let session = session(1200);
        store.create(&session).await.unwrap();

        assert!(store.delete(session.token.as_str()).await.unwrap());
        assert!(!store.delete(session.token.as_str()).await.unwrap());
        assert!(!store.delete("no-such-token").await.unwrap());
    }

    #[tokio::test]
    async fn test_cleanup_removes_exactly_the_expired_rows() {
        let store = MemorySessionStore::new();
        let live = session(1200);
        let expired_a = session(-5);
        let expired_b = session(-500);
        store.create(&live).await.unwrap();
        store.create(&expired_a).await.unwrap();
        store.create(&expired_b).await.unwrap();

        assert_eq!(store.cleanup_expired().await.unwrap(), 2);
        assert_eq!(store.len().await, 1);
        assert!(
            store
                .find_by_token(live.token.as_str())
                .await
                .unwrap()
                .is_some()
        );

        // Second sweep right away removes nothing.
        assert_eq!(store.cleanup_expired().await.unwrap(), 0);
    }
}
