//! Auth (Authentication Gateway) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Session entity, provider boundary, state machine
//! - `application/` - Use cases driving the login/challenge/reset flows
//! - `infra/` - Session stores and the identity provider adapter
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Features
//! - Login against a hosted user-pool identity provider
//! - Forced-password-change challenge flow (NEW_PASSWORD_REQUIRED)
//! - Server-side sessions with opaque high-entropy tokens and expiry
//! - Stateless CSRF protection via cookie echo
//! - Registration and password reset delegated to the provider
//!
//! ## Security Model
//! - The provider is the authority on credentials; this gateway never
//!   sees password hashes
//! - Session tokens carry >= 128 bits of CSPRNG entropy and are the
//!   sole lookup key
//! - Unknown-user and wrong-password failures are indistinguishable
//! - CSRF and token comparisons are constant-time

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::cognito::{CognitoProvider, ProviderConfig};
pub use infra::postgres::PgSessionStore;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::session::*;
    pub use crate::domain::provider::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::memory::MemorySessionStore;
    pub use crate::infra::postgres::PgSessionStore as SessionStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod secrets {
    pub use crate::infra::secrets::*;
}
