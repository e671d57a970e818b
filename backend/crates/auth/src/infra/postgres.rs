//! PostgreSQL Session Store

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entity::session::Session;
use crate::domain::provider::ProviderTokenSet;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// PostgreSQL-backed session store
#[derive(Clone)]
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionRepository for PgSessionStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        // token is the primary key: a colliding insert errors out
        // instead of overwriting an existing row.
        sqlx::query(
            r#"
            INSERT INTO sessions (
                token,
                user_id,
                email,
                access_token,
                id_token,
                refresh_token,
                created_at,
                expires_at_ms
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(session.token.as_str())
        .bind(&session.user_id)
        .bind(&session.email)
        .bind(&session.provider_tokens.access_token)
        .bind(&session.provider_tokens.id_token)
        .bind(&session.provider_tokens.refresh_token)
        .bind(session.created_at)
        .bind(session.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> AuthResult<Option<Session>> {
        let now_ms = Utc::now().timestamp_millis();

        // An expired-but-unswept row must behave as not-found.
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                token,
                user_id,
                email,
                access_token,
                id_token,
                refresh_token,
                created_at,
                expires_at_ms
            FROM sessions
            WHERE token = $1 AND expires_at_ms > $2
            "#,
        )
        .bind(token)
        .bind(now_ms)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn delete(&self, token: &str) -> AuthResult<bool> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }

    async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    token: String,
    user_id: String,
    email: String,
    access_token: String,
    id_token: String,
    refresh_token: String,
    created_at: DateTime<Utc>,
    expires_at_ms: i64,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            token: SessionToken::from_db(self.token),
            user_id: self.user_id,
            email: self.email,
            provider_tokens: ProviderTokenSet {
                access_token: self.access_token,
                id_token: self.id_token,
                refresh_token: self.refresh_token,
            },
            created_at: self.created_at,
            expires_at_ms: self.expires_at_ms,
        }
    }
}
