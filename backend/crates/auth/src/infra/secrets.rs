//! Client Secret Loading
//!
//! The per-client shared secret is resolved once at process startup and
//! cached in the provider configuration; a failed resolution is fatal
//! to startup, never retried inline during a request.

use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("Secret source {0} is not set or empty")]
    Missing(String),

    #[error("Failed to read secret file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Secret file has an invalid format: {0}")]
    Invalid(String),
}

/// Where the client secret comes from
#[derive(Debug, Clone)]
pub enum SecretSource {
    /// Plain environment variable
    Env(String),
    /// File holding either the raw secret or a JSON document with a
    /// `clientSecret` field (the shape secret managers export)
    File(PathBuf),
}

#[derive(Deserialize)]
struct SecretDocument {
    #[serde(rename = "clientSecret")]
    client_secret: String,
}

/// Resolve the client secret from its configured source
pub fn load_client_secret(source: &SecretSource) -> Result<String, SecretError> {
    let secret = match source {
        SecretSource::Env(var) => std::env::var(var)
            .map_err(|_| SecretError::Missing(format!("environment variable {var}")))?,
        SecretSource::File(path) => {
            let raw = std::fs::read_to_string(path)?;
            match serde_json::from_str::<SecretDocument>(&raw) {
                Ok(doc) => doc.client_secret,
                // Not JSON: the file is the secret itself.
                Err(_) => raw.trim().to_string(),
            }
        }
    };

    if secret.is_empty() {
        return Err(SecretError::Missing(format!("{source:?}")));
    }

    Ok(secret)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("auth-secret-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_load_from_json_file() {
        let path = temp_path("json");
        fs::write(&path, r#"{"clientSecret": "s3cret-value"}"#).unwrap();

        let secret = load_client_secret(&SecretSource::File(path.clone())).unwrap();
        assert_eq!(secret, "s3cret-value");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_from_raw_file() {
        let path = temp_path("raw");
        fs::write(&path, "raw-secret\n").unwrap();

        let secret = load_client_secret(&SecretSource::File(path.clone())).unwrap();
        assert_eq!(secret, "raw-secret");

        fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = load_client_secret(&SecretSource::File(temp_path("missing")));
        assert!(matches!(result, Err(SecretError::Io(_))));
    }

    #[test]
    fn test_missing_env_var_is_an_error() {
        let result = load_client_secret(&SecretSource::Env(
            "AUTH_TEST_SECRET_THAT_DOES_NOT_EXIST".to_string(),
        ));
        assert!(matches!(result, Err(SecretError::Missing(_))));
    }
}
