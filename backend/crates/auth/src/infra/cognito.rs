//! Cognito User Pool Adapter
//!
//! Implements [`IdentityProvider`] against the hosted user-pool HTTP
//! API: JSON POSTs with an `X-Amz-Target` operation header, error
//! bodies carrying a `__type` exception name. All flows used here are
//! the client-side (non-admin) ones, authenticated with the pool's
//! client secret hash rather than signed requests.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use base64::{Engine, engine::general_purpose};
use hmac::{Hmac, Mac};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::Sha256;

use crate::domain::provider::{
    AuthChallenge, AuthOutcome, ChallengeAnswer, ChallengeName, IdentityProvider, ProviderError,
    ProviderTokenSet, RegisteredUser, ResolvedAuth,
};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";

/// Provider connection configuration
///
/// The client secret is resolved once at startup (see
/// `infra::secrets`) and cached here for the life of the process.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Pool region, used to derive the endpoint
    pub region: String,
    /// Application client id
    pub client_id: String,
    /// Per-client shared secret
    pub client_secret: String,
    /// Endpoint override (local stacks, tests)
    pub endpoint: Option<String>,
    /// Bound on every provider call
    pub timeout: Duration,
}

impl ProviderConfig {
    pub fn new(
        region: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            endpoint: None,
            timeout: Duration::from_secs(10),
        }
    }

    fn endpoint_url(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.clone(),
            None => format!("https://cognito-idp.{}.amazonaws.com/", self.region),
        }
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("region", &self.region)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Identity provider adapter over HTTP
#[derive(Clone)]
pub struct CognitoProvider {
    http: reqwest::Client,
    config: ProviderConfig,
}

impl CognitoProvider {
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Keyed hash binding username + client id, required by the
    /// provider protocol on every credential-bearing call
    fn secret_hash(&self, username: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.config.client_secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(username.as_bytes());
        mac.update(self.config.client_id.as_bytes());

        general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        body: &impl Serialize,
    ) -> Result<T, ProviderError> {
        let payload =
            serde_json::to_vec(body).map_err(|e| ProviderError::Protocol(e.to_string()))?;

        let response = self
            .http
            .post(self.config.endpoint_url())
            .header("X-Amz-Target", format!("{TARGET_PREFIX}.{operation}"))
            .header(CONTENT_TYPE, AMZ_JSON)
            .body(payload)
            .send()
            .await
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;

        if response.status().is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| ProviderError::Protocol(e.to_string()));
        }

        let status = response.status();
        let error: ErrorBody = response
            .json()
            .await
            .unwrap_or_else(|_| ErrorBody::default());

        Err(normalize_error(status.as_u16(), &error))
    }
}

impl IdentityProvider for CognitoProvider {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<AuthOutcome, ProviderError> {
        let request = InitiateAuthRequest {
            auth_flow: "USER_PASSWORD_AUTH",
            client_id: &self.config.client_id,
            auth_parameters: HashMap::from([
                ("USERNAME", username.to_string()),
                ("PASSWORD", password.to_string()),
                ("SECRET_HASH", self.secret_hash(username)),
            ]),
        };

        let response: AuthResponse = self.call("InitiateAuth", &request).await?;

        // The provider always supplies exactly one of the two cases;
        // this is a discriminated check, never a guess.
        if let Some(name) = response.challenge_name {
            return Ok(AuthOutcome::Challenge(AuthChallenge {
                name: ChallengeName::parse(&name),
                provider_session: response.session.unwrap_or_default(),
                params: response.challenge_parameters,
            }));
        }

        let result = response
            .authentication_result
            .ok_or_else(|| ProviderError::Protocol("neither result nor challenge".to_string()))?;

        Ok(AuthOutcome::Resolved(result.into_resolved()))
    }

    async fn respond_to_challenge(
        &self,
        challenge: &ChallengeName,
        answer: &ChallengeAnswer,
    ) -> Result<ResolvedAuth, ProviderError> {
        // Refuse unanswerable challenges before any remote call.
        let ChallengeName::NewPasswordRequired = challenge else {
            return Err(ProviderError::UnsupportedChallenge(challenge.to_string()));
        };

        let request = RespondToChallengeRequest {
            client_id: &self.config.client_id,
            challenge_name: "NEW_PASSWORD_REQUIRED",
            session: &answer.provider_session,
            challenge_responses: HashMap::from([
                ("USERNAME", answer.username.clone()),
                ("NEW_PASSWORD", answer.new_password.clone()),
                ("SECRET_HASH", self.secret_hash(&answer.username)),
            ]),
        };

        let response: AuthResponse = self.call("RespondToAuthChallenge", &request).await?;

        let result = response
            .authentication_result
            .ok_or_else(|| ProviderError::Protocol("challenge did not resolve".to_string()))?;

        Ok(result.into_resolved())
    }

    async fn register(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<RegisteredUser, ProviderError> {
        let request = SignUpRequest {
            client_id: &self.config.client_id,
            username,
            password,
            secret_hash: self.secret_hash(username),
            user_attributes: vec![Attribute {
                name: "email",
                value: email.to_string(),
            }],
        };

        let response: SignUpResponse = self.call("SignUp", &request).await?;

        Ok(RegisteredUser {
            user_sub: response.user_sub,
        })
    }

    async fn initiate_password_reset(&self, username: &str) -> Result<(), ProviderError> {
        let request = ForgotPasswordRequest {
            client_id: &self.config.client_id,
            username,
            secret_hash: self.secret_hash(username),
        };

        match self
            .call::<serde_json::Value>("ForgotPassword", &request)
            .await
        {
            Ok(_) => Ok(()),
            // Account existence must not be observable here.
            Err(ProviderError::UserNotFound) => {
                tracing::debug!("Password reset for unknown account reported as sent");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    async fn confirm_password_reset(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> Result<(), ProviderError> {
        let request = ConfirmForgotPasswordRequest {
            client_id: &self.config.client_id,
            username,
            confirmation_code: code,
            password: new_password,
            secret_hash: self.secret_hash(username),
        };

        self.call::<serde_json::Value>("ConfirmForgotPassword", &request)
            .await?;

        Ok(())
    }
}

// ============================================================================
// Error normalization
// ============================================================================

/// Strip an optional `namespace#` prefix from a `__type` value
fn exception_name(raw: &str) -> &str {
    raw.rsplit('#').next().unwrap_or(raw)
}

fn normalize_error(status: u16, body: &ErrorBody) -> ProviderError {
    let name = body.kind.as_deref().map(exception_name).unwrap_or("");

    match name {
        "NotAuthorizedException" => ProviderError::BadCredentials,
        "UserNotFoundException" => ProviderError::UserNotFound,
        "UserNotConfirmedException" => ProviderError::AccountNotVerified,
        "PasswordResetRequiredException" => ProviderError::ResetRequired,
        "TooManyRequestsException" | "LimitExceededException" => ProviderError::RateLimited,
        "InvalidParameterException" => ProviderError::InvalidParameter,
        "InvalidPasswordException" => ProviderError::PasswordPolicy,
        "UsernameExistsException" => ProviderError::UserExists,
        "CodeMismatchException" => ProviderError::CodeMismatch,
        "ExpiredCodeException" => ProviderError::CodeExpired,
        other => ProviderError::Protocol(format!(
            "{} (status {status}): {}",
            if other.is_empty() { "unknown error" } else { other },
            body.message.as_deref().unwrap_or("no message")
        )),
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Serialize)]
struct InitiateAuthRequest<'a> {
    #[serde(rename = "AuthFlow")]
    auth_flow: &'a str,
    #[serde(rename = "ClientId")]
    client_id: &'a str,
    #[serde(rename = "AuthParameters")]
    auth_parameters: HashMap<&'static str, String>,
}

#[derive(Serialize)]
struct RespondToChallengeRequest<'a> {
    #[serde(rename = "ClientId")]
    client_id: &'a str,
    #[serde(rename = "ChallengeName")]
    challenge_name: &'a str,
    #[serde(rename = "Session")]
    session: &'a str,
    #[serde(rename = "ChallengeResponses")]
    challenge_responses: HashMap<&'static str, String>,
}

#[derive(Serialize)]
struct Attribute {
    #[serde(rename = "Name")]
    name: &'static str,
    #[serde(rename = "Value")]
    value: String,
}

#[derive(Serialize)]
struct SignUpRequest<'a> {
    #[serde(rename = "ClientId")]
    client_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
    #[serde(rename = "SecretHash")]
    secret_hash: String,
    #[serde(rename = "UserAttributes")]
    user_attributes: Vec<Attribute>,
}

#[derive(Serialize)]
struct ForgotPasswordRequest<'a> {
    #[serde(rename = "ClientId")]
    client_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "SecretHash")]
    secret_hash: String,
}

#[derive(Serialize)]
struct ConfirmForgotPasswordRequest<'a> {
    #[serde(rename = "ClientId")]
    client_id: &'a str,
    #[serde(rename = "Username")]
    username: &'a str,
    #[serde(rename = "ConfirmationCode")]
    confirmation_code: &'a str,
    #[serde(rename = "Password")]
    password: &'a str,
    #[serde(rename = "SecretHash")]
    secret_hash: String,
}

#[derive(Deserialize)]
struct AuthResponse {
    #[serde(rename = "AuthenticationResult")]
    authentication_result: Option<AuthenticationResult>,
    #[serde(rename = "ChallengeName")]
    challenge_name: Option<String>,
    #[serde(rename = "Session")]
    session: Option<String>,
    #[serde(rename = "ChallengeParameters", default)]
    challenge_parameters: HashMap<String, String>,
}

#[derive(Deserialize)]
struct AuthenticationResult {
    #[serde(rename = "AccessToken")]
    access_token: Option<String>,
    #[serde(rename = "IdToken")]
    id_token: Option<String>,
    #[serde(rename = "RefreshToken")]
    refresh_token: Option<String>,
    #[serde(rename = "ExpiresIn")]
    expires_in: Option<u32>,
}

impl AuthenticationResult {
    fn into_resolved(self) -> ResolvedAuth {
        ResolvedAuth {
            tokens: ProviderTokenSet {
                access_token: self.access_token.unwrap_or_default(),
                id_token: self.id_token.unwrap_or_default(),
                refresh_token: self.refresh_token.unwrap_or_default(),
            },
            expires_in_secs: self.expires_in,
        }
    }
}

#[derive(Deserialize)]
struct SignUpResponse {
    #[serde(rename = "UserSub")]
    user_sub: String,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(rename = "message", alias = "Message")]
    message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(server: &MockServer) -> ProviderConfig {
        ProviderConfig {
            region: "eu-west-1".to_string(),
            client_id: "client123".to_string(),
            client_secret: "topsecret".to_string(),
            endpoint: Some(server.uri()),
            timeout: Duration::from_millis(500),
        }
    }

    fn target(operation: &str) -> String {
        format!("{TARGET_PREFIX}.{operation}")
    }

    #[test]
    fn test_secret_hash_vector() {
        let config = ProviderConfig::new("eu-west-1", "client123", "topsecret");
        let provider = CognitoProvider::new(config).unwrap();

        // Precomputed: base64(HMAC-SHA256("topsecret", "alice" + "client123"))
        assert_eq!(
            provider.secret_hash("alice"),
            "QOaF4kSzdPw1nPLE5QMEoi2mW87FFhdfpWgk5WhA12c="
        );
    }

    #[test]
    fn test_secret_hash_depends_on_username() {
        let config = ProviderConfig::new("eu-west-1", "client123", "topsecret");
        let provider = CognitoProvider::new(config).unwrap();

        assert_ne!(provider.secret_hash("alice"), provider.secret_hash("bob"));
    }

    #[test]
    fn test_exception_name_strips_namespace() {
        assert_eq!(
            exception_name("com.amazonaws.cognito#NotAuthorizedException"),
            "NotAuthorizedException"
        );
        assert_eq!(
            exception_name("NotAuthorizedException"),
            "NotAuthorizedException"
        );
    }

    #[tokio::test]
    async fn test_authenticate_resolves_token_bundle() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", target("InitiateAuth").as_str()))
            .and(header("Content-Type", AMZ_JSON))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "access-xyz",
                    "IdToken": "id-xyz",
                    "RefreshToken": "refresh-xyz",
                    "ExpiresIn": 3600
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let outcome = provider.authenticate("alice", "correct-horse").await.unwrap();

        let AuthOutcome::Resolved(resolved) = outcome else {
            panic!("expected resolved outcome");
        };
        assert_eq!(resolved.tokens.access_token, "access-xyz");
        assert_eq!(resolved.expires_in_secs, Some(3600));
    }

    #[tokio::test]
    async fn test_authenticate_surfaces_challenge() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ChallengeName": "NEW_PASSWORD_REQUIRED",
                "Session": "sess-xyz",
                "ChallengeParameters": {"USER_ID_FOR_SRP": "bob"}
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let outcome = provider.authenticate("bob", "TempPass123").await.unwrap();

        let AuthOutcome::Challenge(challenge) = outcome else {
            panic!("expected challenge outcome");
        };
        assert_eq!(challenge.name, ChallengeName::NewPasswordRequired);
        assert_eq!(challenge.provider_session, "sess-xyz");
        assert_eq!(
            challenge.params.get("USER_ID_FOR_SRP"),
            Some(&"bob".to_string())
        );
    }

    #[tokio::test]
    async fn test_authenticate_normalizes_prefixed_error_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "com.amazonaws.cognito#NotAuthorizedException",
                "message": "Incorrect username or password."
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider.authenticate("alice", "wrong").await.unwrap_err();

        assert_eq!(err, ProviderError::BadCredentials);
    }

    #[tokio::test]
    async fn test_unknown_exception_maps_to_protocol_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "__type": "InternalErrorException",
                "message": "Something broke"
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider.authenticate("alice", "pw").await.unwrap_err();

        assert!(matches!(err, ProviderError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_unavailable_not_bad_credentials() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"AuthenticationResult": {}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider.authenticate("alice", "pw").await.unwrap_err();

        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_unsupported_challenge_makes_no_remote_call() {
        let server = MockServer::start().await;
        // Any request arriving here fails the expectation.
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let answer = ChallengeAnswer {
            username: "bob".to_string(),
            provider_session: "sess-xyz".to_string(),
            new_password: "NewStrongPass1".to_string(),
        };

        let err = provider
            .respond_to_challenge(&ChallengeName::Other("SMS_MFA".to_string()), &answer)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ProviderError::UnsupportedChallenge("SMS_MFA".to_string())
        );
    }

    #[tokio::test]
    async fn test_respond_to_challenge_resolves() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                target("RespondToAuthChallenge").as_str(),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "AuthenticationResult": {
                    "AccessToken": "access-new",
                    "IdToken": "id-new",
                    "RefreshToken": "refresh-new",
                    "ExpiresIn": 3600
                }
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let answer = ChallengeAnswer {
            username: "bob".to_string(),
            provider_session: "sess-xyz".to_string(),
            new_password: "NewStrongPass1".to_string(),
        };

        let resolved = provider
            .respond_to_challenge(&ChallengeName::NewPasswordRequired, &answer)
            .await
            .unwrap();
        assert_eq!(resolved.tokens.access_token, "access-new");
    }

    #[tokio::test]
    async fn test_register_returns_user_sub() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", target("SignUp").as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "UserSub": "8a6e1c2e-0000-4000-8000-000000000000",
                "UserConfirmed": true
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let registered = provider
            .register("carol@x.com", "pw12345678", "carol@x.com")
            .await
            .unwrap();

        assert_eq!(registered.user_sub, "8a6e1c2e-0000-4000-8000-000000000000");
    }

    #[tokio::test]
    async fn test_register_duplicate_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "UsernameExistsException",
                "message": "User already exists"
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider
            .register("carol@x.com", "pw12345678", "carol@x.com")
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::UserExists);
    }

    #[tokio::test]
    async fn test_reset_initiation_swallows_unknown_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header("X-Amz-Target", target("ForgotPassword").as_str()))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "UserNotFoundException",
                "message": "User does not exist."
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        // Success reported even though the account does not exist.
        provider.initiate_password_reset("nobody").await.unwrap();
    }

    #[tokio::test]
    async fn test_reset_initiation_reports_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "LimitExceededException",
                "message": "Attempt limit exceeded"
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider
            .initiate_password_reset("alice")
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::RateLimited);
    }

    #[tokio::test]
    async fn test_reset_confirmation_code_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(header(
                "X-Amz-Target",
                target("ConfirmForgotPassword").as_str(),
            ))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "CodeMismatchException",
                "message": "Invalid verification code provided"
            })))
            .mount(&server)
            .await;

        let provider = CognitoProvider::new(config_for(&server)).unwrap();
        let err = provider
            .confirm_password_reset("alice", "000000", "NewStrongPass1")
            .await
            .unwrap_err();

        assert_eq!(err, ProviderError::CodeMismatch);
    }
}
