//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod login;
pub mod logout;
pub mod password_reset;
pub mod register;
pub mod respond_challenge;
pub mod verify_session;

// Re-exports
pub use config::AuthConfig;
pub use login::{LoginInput, LoginOutcome, LoginUseCase};
pub use logout::LogoutUseCase;
pub use password_reset::PasswordResetUseCase;
pub use register::{RegisterInput, RegisterOutput, RegisterUseCase};
pub use respond_challenge::{ChallengeInput, RespondChallengeUseCase};
pub use verify_session::{SessionInfoOutput, VerifySessionUseCase};
