//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use platform::{cookie, csrf};

use crate::application::config::AuthConfig;
use crate::application::{
    ChallengeInput, LoginInput, LoginOutcome, LoginUseCase, LogoutUseCase, PasswordResetUseCase,
    RegisterInput, RegisterUseCase, RespondChallengeUseCase, VerifySessionUseCase,
};
use crate::domain::provider::IdentityProvider;
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChallengeRequest, ChallengeResponse, CsrfTokenResponse, LoginRequest, LoginResponse,
    LogoutRequest, LogoutResponse, MessageResponse, PasswordResetConfirmRequest,
    PasswordResetInitiateRequest, RegisterRequest, RegisterResponse, SessionPayload, UserPayload,
    VerifyRequest, VerifyResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<S, P>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    pub sessions: Arc<S>,
    pub provider: Arc<P>,
    pub config: Arc<AuthConfig>,
}

// ============================================================================
// CSRF issuance
// ============================================================================

/// GET /api/login
///
/// Opens a login attempt: sets the csrf_token cookie and returns the
/// same value in the body for the client to echo.
pub async fn issue_csrf<S, P>(State(state): State<AuthAppState<S, P>>) -> impl IntoResponse
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let token = csrf::issue();
    let cookie = state.config.csrf_cookie().build_set_cookie(&token);

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(CsrfTokenResponse { csrf_token: token }),
    )
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/login
pub async fn login<S, P>(
    State(state): State<AuthAppState<S, P>>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Response>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let csrf_cookie = cookie::extract_cookie(&headers, &state.config.csrf_cookie_name);

    let use_case = LoginUseCase::new(
        state.sessions.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let input = LoginInput {
        username: req.username,
        password: req.password,
        csrf_token: req.csrf_token,
        csrf_cookie,
    };

    match use_case.execute(input).await? {
        LoginOutcome::ChallengeRequired { challenge } => Ok(Json(LoginResponse {
            success: true,
            session: Some(challenge.provider_session),
            challenge_name: Some(challenge.name.to_string()),
            challenge_params: Some(challenge.params),
        })
        .into_response()),
        LoginOutcome::Authenticated { session } => {
            // The attempt is over; the CSRF token must not outlive it.
            let clear_csrf = state.config.csrf_cookie().build_delete_cookie();

            Ok((
                StatusCode::OK,
                [(header::SET_COOKIE, clear_csrf)],
                Json(LoginResponse {
                    success: true,
                    session: Some(session.token.into_string()),
                    challenge_name: None,
                    challenge_params: None,
                }),
            )
                .into_response())
        }
    }
}

// ============================================================================
// Challenge
// ============================================================================

/// POST /api/challenge
pub async fn respond_challenge<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<ChallengeRequest>,
) -> AuthResult<Json<ChallengeResponse>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = RespondChallengeUseCase::new(
        state.sessions.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let input = ChallengeInput {
        challenge_name: req.challenge_name,
        username: req.username,
        provider_session: req.session,
        new_password: req.new_password,
    };

    let session = use_case.execute(input).await?;

    Ok(Json(ChallengeResponse {
        success: true,
        session: session.token.into_string(),
    }))
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/register
pub async fn register<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<Json<RegisterResponse>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.sessions.clone(),
        state.provider.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        username: req.username,
        password: req.password,
        email: req.email,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(RegisterResponse {
        success: true,
        user_sub: output.user_sub,
        session: output.session.token.into_string(),
    }))
}

// ============================================================================
// Password reset
// ============================================================================

/// POST /api/password-reset/initiate
pub async fn password_reset_initiate<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<PasswordResetInitiateRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    if req.username.is_empty() {
        return Err(AuthError::MissingField("username"));
    }

    let use_case = PasswordResetUseCase::new(state.provider.clone());
    let message = use_case.initiate(&req.username).await?;

    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}

/// POST /api/password-reset/confirm
pub async fn password_reset_confirm<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<PasswordResetConfirmRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    if req.username.is_empty() || req.confirmation_code.is_empty() || req.new_password.is_empty() {
        return Err(AuthError::MissingField(
            "username, confirmationCode and newPassword",
        ));
    }

    let use_case = PasswordResetUseCase::new(state.provider.clone());
    let message = use_case
        .confirm(&req.username, &req.confirmation_code, &req.new_password)
        .await?;

    Ok(Json(MessageResponse {
        success: true,
        message,
    }))
}

// ============================================================================
// Session verify / logout
// ============================================================================

/// POST /api/verify
pub async fn verify_session<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<VerifyRequest>,
) -> AuthResult<Response>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    if req.session.is_empty() {
        return Err(AuthError::MissingField("session"));
    }

    let use_case = VerifySessionUseCase::new(state.sessions.clone());

    match use_case.execute(&req.session).await {
        Ok(info) => Ok(Json(VerifyResponse {
            valid: true,
            user: Some(UserPayload {
                id: info.user_id,
                email: info.email,
            }),
            session: Some(SessionPayload {
                created_at_ms: info.created_at_ms,
                expires_at_ms: info.expires_at_ms,
            }),
        })
        .into_response()),
        Err(AuthError::SessionInvalid) => Ok((
            StatusCode::UNAUTHORIZED,
            Json(VerifyResponse {
                valid: false,
                user: None,
                session: None,
            }),
        )
            .into_response()),
        Err(err) => Err(err),
    }
}

/// POST /api/logout
pub async fn logout<S, P>(
    State(state): State<AuthAppState<S, P>>,
    Json(req): Json<LogoutRequest>,
) -> AuthResult<Json<LogoutResponse>>
where
    S: SessionRepository + Clone + Send + Sync + 'static,
    P: IdentityProvider + Clone + Send + Sync + 'static,
{
    if req.session.is_empty() {
        return Err(AuthError::MissingField("session"));
    }

    let use_case = LogoutUseCase::new(state.sessions.clone());

    // Best-effort: a token that is already gone still ends the session.
    let _ = use_case.execute(&req.session).await?;

    Ok(Json(LogoutResponse { success: true }))
}
