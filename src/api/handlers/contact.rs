use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::MessageBody;
use crate::api::response::{ApiError, AppJson};
use crate::email;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub name: String,
    pub email: String,
    pub message: String,
    pub captcha_token: String,
}

/// POST /api/send-email — CAPTCHA check, then SMTP relay.
pub async fn send_email(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SendEmailRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    let (config, mailer) = match (state.config.email.as_ref(), state.mailer.as_ref()) {
        (Some(config), Some(mailer)) => (config, mailer),
        _ => return Err(ApiError::unavailable("Contact form is not configured")),
    };

    let captcha_ok = email::verify_captcha(&state.http, &config.captcha_secret, &req.captcha_token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "CAPTCHA verification request failed");
            ApiError::internal("Error sending email.")
        })?;

    if !captcha_ok {
        return Err(ApiError::bad_request("CAPTCHA verification failed."));
    }

    email::send_contact_email(mailer, config, &req.name, &req.email, &req.message)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to relay contact email");
            ApiError::internal("Error sending email.")
        })?;

    tracing::info!("Contact email relayed");
    Ok(Json(MessageBody::new("Email sent successfully.")))
}
