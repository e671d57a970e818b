//! Password Reset Use Case
//!
//! Both steps delegate to the provider; the gateway adds nothing but
//! error mapping and the anti-enumeration response policy.

use std::sync::Arc;

use crate::domain::provider::IdentityProvider;
use crate::error::AuthResult;

/// One fixed message regardless of whether the account exists.
const INITIATED_MESSAGE: &str = "If the account exists, a password reset code has been sent";

const CONFIRMED_MESSAGE: &str = "Password has been reset successfully";

/// Password reset use case
pub struct PasswordResetUseCase<P>
where
    P: IdentityProvider,
{
    provider: Arc<P>,
}

impl<P> PasswordResetUseCase<P>
where
    P: IdentityProvider,
{
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Start a reset; the provider delivers the code out of band
    pub async fn initiate(&self, username: &str) -> AuthResult<&'static str> {
        self.provider.initiate_password_reset(username).await?;

        tracing::info!("Password reset initiated");
        Ok(INITIATED_MESSAGE)
    }

    /// Finish a reset with the delivered confirmation code
    pub async fn confirm(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> AuthResult<&'static str> {
        self.provider
            .confirm_password_reset(username, code, new_password)
            .await?;

        tracing::info!("Password reset confirmed");
        Ok(CONFIRMED_MESSAGE)
    }
}
