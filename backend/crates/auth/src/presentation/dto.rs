//! API DTOs (Data Transfer Objects)

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ============================================================================
// CSRF
// ============================================================================

/// CSRF token response (GET /api/login)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsrfTokenResponse {
    pub csrf_token: String,
}

// ============================================================================
// Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Echo of the token set in the csrf_token cookie
    #[serde(default)]
    pub csrf_token: String,
}

/// Login response
///
/// `session` carries the gateway session token on full success, or the
/// provider's continuation handle when a challenge is pending (the
/// `challengeName` field discriminates the two).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub challenge_params: Option<HashMap<String, String>>,
}

// ============================================================================
// Challenge
// ============================================================================

/// Challenge response request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeRequest {
    pub challenge_name: String,
    pub username: String,
    /// Provider continuation handle from the login response
    pub session: String,
    pub new_password: Option<String>,
}

/// Challenge response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeResponse {
    pub success: bool,
    /// Gateway session token
    pub session: String,
}

// ============================================================================
// Register
// ============================================================================

/// Register request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Register response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub success: bool,
    pub user_sub: String,
    /// Session token from the immediate follow-up login
    pub session: String,
}

// ============================================================================
// Password reset
// ============================================================================

/// Password reset initiation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetInitiateRequest {
    pub username: String,
}

/// Password reset confirmation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetConfirmRequest {
    pub username: String,
    pub confirmation_code: String,
    pub new_password: String,
}

/// Generic message response for the reset endpoints
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub success: bool,
    pub message: &'static str,
}

// ============================================================================
// Session verify / logout
// ============================================================================

/// Session verification request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
    pub session: String,
}

/// User payload in a verification response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub id: String,
    pub email: String,
}

/// Session payload in a verification response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPayload {
    pub created_at_ms: i64,
    pub expires_at_ms: i64,
}

/// Session verification response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserPayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionPayload>,
}

/// Logout request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    pub session: String,
}

/// Logout response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogoutResponse {
    pub success: bool,
}
