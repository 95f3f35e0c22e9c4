use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{collect_multipart, MessageBody};
use crate::api::response::{ApiError, AppJson};
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::{Bio, ProfilePicture, Settings};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct BioEnvelope {
    pub bio: Option<Bio>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBioRequest {
    #[serde(default)]
    pub bio_text: String,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetBackgroundRequest {
    pub image_url: String,
}

// ============================================================================
// Bio
// ============================================================================

pub async fn get_bio(State(state): State<Arc<AppState>>) -> Result<Json<BioEnvelope>, ApiError> {
    let bio = state
        .db
        .get_bio()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(BioEnvelope { bio }))
}

/// Upsert: the bio is a single row, so a second post overwrites the first.
pub async fn update_bio(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<UpdateBioRequest>,
) -> Result<Json<Bio>, ApiError> {
    let bio = state
        .db
        .upsert_bio(req.bio_text, req.profile_picture_url)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(bio))
}

// ============================================================================
// Settings
// ============================================================================

pub async fn get_background_image(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Settings>, ApiError> {
    let settings = state
        .db
        .get_settings()
        .map_err(|e| ApiError::internal(e.to_string()))?
        .unwrap_or(Settings {
            background_image_url: None,
        });
    Ok(Json(settings))
}

pub async fn set_background_image(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<SetBackgroundRequest>,
) -> Result<(StatusCode, Json<Settings>), ApiError> {
    let settings = state
        .db
        .upsert_settings(Some(req.image_url))
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok((StatusCode::CREATED, Json(settings)))
}

// ============================================================================
// Profile pictures
// ============================================================================

pub async fn list_profile_pictures(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<ProfilePicture>>, ApiError> {
    let pictures = state
        .db
        .list_profile_pictures()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(pictures))
}

pub async fn upload_profile_picture(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ProfilePicture>), ApiError> {
    let (file, _) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("Image upload failed"))?;

    let name = unique_name(&file.file_name);
    let image_url = state
        .object_store
        .put(&name, file.data, file.content_type.as_deref())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))?;

    let picture = match state.db.insert_profile_picture(image_url) {
        Ok(picture) => picture,
        Err(e) => {
            let _ = state.object_store.delete(&name).await;
            return Err(ApiError::internal(e.to_string()));
        }
    };

    Ok((StatusCode::CREATED, Json(picture)))
}

pub async fn delete_profile_picture(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageBody>, ApiError> {
    let picture = state
        .db
        .get_profile_picture(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Profile picture not found"))?;

    if let Some(name) = object_name_from_url(&picture.image_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(picture_id = %id, error = %e, "Failed to delete profile picture blob");
        }
    }

    state
        .db
        .delete_profile_picture(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(MessageBody::new("Profile picture deleted")))
}
