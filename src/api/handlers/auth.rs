use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::{ApiError, AppJson};
use crate::auth;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: u64,
    pub username: String,
    pub role: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/login
pub async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let user = state
        .db
        .get_user_by_username(&req.username)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::bad_request("Invalid Credentials"))?;

    // bcrypt is CPU-bound; keep the async executor free
    let password = req.password;
    let hash = user.password_hash.clone();
    let password_ok = tokio::task::spawn_blocking(move || auth::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("Password check failed: {e}")))?;

    if !password_ok {
        tracing::warn!(username = %user.username, "Failed login attempt");
        return Err(ApiError::bad_request("Invalid Credentials"));
    }

    let token = auth::create_token(&state.config.auth.jwt_secret, user.id, &user.role)
        .map_err(|e| ApiError::internal(format!("Failed to create token: {e}")))?;

    tracing::info!(username = %user.username, "Successful login");
    Ok(Json(TokenResponse { token }))
}

/// POST /auth/register
///
/// Open only while no account exists (first-run bootstrap); afterwards an
/// admin token is required.
pub async fn register(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    AppJson(req): AppJson<RegisterRequest>,
) -> Result<(StatusCode, Json<UserResponse>), ApiError> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(ApiError::bad_request("Username and password are required"));
    }

    let existing = state
        .db
        .user_count()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    if existing > 0 {
        auth::authorize_admin(&state.config.auth.jwt_secret, &headers)?;
    }

    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || auth::hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("Hashing task failed: {e}")))?
        .map_err(|e| ApiError::internal(format!("Failed to process password: {e}")))?;

    let user = state
        .db
        .create_user(req.username.trim().to_string(), password_hash, req.role)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::conflict("Username is already taken"))?;

    tracing::info!(username = %user.username, role = %user.role, "Registered account");
    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user.id,
            username: user.username,
            role: user.role,
        }),
    ))
}
