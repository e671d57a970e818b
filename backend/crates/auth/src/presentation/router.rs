//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::SessionRepository;
use crate::infra::cognito::CognitoProvider;
use crate::infra::postgres::PgSessionStore;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with the production store and provider
pub fn auth_router(
    sessions: PgSessionStore,
    provider: CognitoProvider,
    config: AuthConfig,
) -> Router {
    auth_router_generic(sessions, provider, config)
}

/// Create a generic Auth router for any store/provider implementation
pub fn auth_router_generic<S, P>(sessions: S, provider: P, config: AuthConfig) -> Router
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        sessions: Arc::new(sessions),
        provider: Arc::new(provider),
        config: Arc::new(config),
    };

    Router::new()
        .route(
            "/login",
            get(handlers::issue_csrf::<S, P>).post(handlers::login::<S, P>),
        )
        .route("/challenge", post(handlers::respond_challenge::<S, P>))
        .route("/register", post(handlers::register::<S, P>))
        .route(
            "/password-reset/initiate",
            post(handlers::password_reset_initiate::<S, P>),
        )
        .route(
            "/password-reset/confirm",
            post(handlers::password_reset_confirm::<S, P>),
        )
        .route("/verify", post(handlers::verify_session::<S, P>))
        .route("/logout", post(handlers::logout::<S, P>))
        .with_state(state)
}
