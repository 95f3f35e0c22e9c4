//! Token issuing and the admin gate.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

/// Access token lifetime.
const TOKEN_TTL_HOURS: i64 = 12;

/// The role required by gated routes.
pub const ADMIN_ROLE: &str = "admin";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id
    pub sub: u64,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn create_token(
    secret: &str,
    user_id: u64,
    role: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Check the request for a valid admin token. Missing header is 401, a token
/// that fails verification is 400, a valid token without the admin role 403.
pub fn authorize_admin(secret: &str, headers: &HeaderMap) -> Result<Claims, ApiError> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::unauthorized("Access Denied"))?;

    let token = header_value
        .strip_prefix("Bearer ")
        .unwrap_or(header_value);

    let claims =
        decode_token(secret, token).map_err(|_| ApiError::bad_request("Invalid Token"))?;

    if claims.role != ADMIN_ROLE {
        return Err(ApiError::forbidden("Forbidden"));
    }

    Ok(claims)
}

/// Extractor form of the admin gate for routes that are always protected.
pub struct AdminClaims(pub Claims);

#[axum::async_trait]
impl FromRequestParts<Arc<AppState>> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, ApiError> {
        let claims = authorize_admin(&state.config.auth.jwt_secret, &parts.headers)?;
        Ok(AdminClaims(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_preserves_claims() {
        let token = create_token(SECRET, 7, ADMIN_ROLE).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, ADMIN_ROLE);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn decode_rejects_wrong_secret() {
        let token = create_token(SECRET, 1, ADMIN_ROLE).unwrap();
        assert!(decode_token("other-secret", &token).is_err());
    }

    #[test]
    fn password_hash_verifies() {
        let hash = hash_password("hunter2").unwrap();
        assert!(verify_password("hunter2", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn authorize_admin_maps_failures() {
        let mut headers = HeaderMap::new();
        assert!(matches!(
            authorize_admin(SECRET, &headers),
            Err(ApiError::Fail(code, _)) if code == axum::http::StatusCode::UNAUTHORIZED
        ));

        headers.insert(header::AUTHORIZATION, "garbage".parse().unwrap());
        assert!(matches!(
            authorize_admin(SECRET, &headers),
            Err(ApiError::Fail(code, _)) if code == axum::http::StatusCode::BAD_REQUEST
        ));

        let visitor = create_token(SECRET, 2, "visitor").unwrap();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {visitor}").parse().unwrap(),
        );
        assert!(matches!(
            authorize_admin(SECRET, &headers),
            Err(ApiError::Fail(code, _)) if code == axum::http::StatusCode::FORBIDDEN
        ));

        let admin = create_token(SECRET, 3, ADMIN_ROLE).unwrap();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {admin}").parse().unwrap(),
        );
        assert!(authorize_admin(SECRET, &headers).is_ok());
    }
}
