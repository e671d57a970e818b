//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieConfig;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// CSRF cookie name
    pub csrf_cookie_name: String,
    /// CSRF cookie lifetime (1 hour)
    pub csrf_ttl: Duration,
    /// Session TTL used when the provider does not report `expires_in`
    pub default_session_ttl: Duration,
    /// Whether to require Secure cookies
    pub cookie_secure: bool,
    /// SameSite policy for the CSRF cookie
    pub cookie_same_site: SameSite,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            csrf_cookie_name: "csrf_token".to_string(),
            csrf_ttl: Duration::from_secs(3600), // 1 hour
            default_session_ttl: Duration::from_secs(1200), // 20 minutes
            cookie_secure: true,
            cookie_same_site: SameSite::Strict,
        }
    }
}

impl AuthConfig {
    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Default::default()
        }
    }

    /// Cookie settings for the CSRF round-trip
    pub fn csrf_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.csrf_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.csrf_ttl.as_secs() as i64),
        }
    }

    /// Session TTL for a resolved authentication
    ///
    /// The provider's `expires_in` wins when present; the configured
    /// default covers providers that omit it.
    pub fn session_ttl(&self, expires_in_secs: Option<u32>) -> chrono::Duration {
        match expires_in_secs {
            Some(secs) => chrono::Duration::seconds(i64::from(secs)),
            None => chrono::Duration::seconds(self.default_session_ttl.as_secs() as i64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csrf_cookie_settings() {
        let config = AuthConfig::default();
        let cookie = config.csrf_cookie().build_set_cookie("tok");

        assert!(cookie.starts_with("csrf_token=tok"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Max-Age=3600"));
    }

    #[test]
    fn test_development_disables_secure() {
        let cookie = AuthConfig::development().csrf_cookie().build_set_cookie("t");
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_ttl_prefers_provider_value() {
        let config = AuthConfig::default();
        assert_eq!(config.session_ttl(Some(3600)).num_seconds(), 3600);
        assert_eq!(config.session_ttl(None).num_seconds(), 1200);
    }
}
