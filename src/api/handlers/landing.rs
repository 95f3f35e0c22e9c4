use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::collect_multipart;
use crate::api::response::{ApiError, AppJson};
use crate::media;
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::LandingSlide;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdateSlideRequest {
    pub order: u32,
}

pub async fn list_slides(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LandingSlide>>, ApiError> {
    let slides = state
        .db
        .list_landing_slides()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(slides))
}

pub async fn create_slide(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<LandingSlide>), ApiError> {
    let (file, _) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("Image upload failed"))?;

    // Slides only ever render full-bleed; recompress before storing
    let data = file.data.clone();
    let compressed = tokio::task::spawn_blocking(move || media::recompress(&data))
        .await
        .map_err(|e| ApiError::internal(format!("Recompression task failed: {e}")))?
        .map_err(|_| ApiError::bad_request("File content is not a decodable image"))?;

    let name = unique_name(&media::recompressed_name(&file.file_name));
    let image_url = state
        .object_store
        .put(&name, compressed.into(), Some("image/jpeg"))
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))?;

    let slide = match state.db.insert_landing_slide(image_url) {
        Ok(slide) => slide,
        Err(e) => {
            let _ = state.object_store.delete(&name).await;
            return Err(ApiError::internal(e.to_string()));
        }
    };

    tracing::debug!(slide_id = %slide.id, "Uploaded landing-page slide");
    Ok((StatusCode::CREATED, Json(slide)))
}

pub async fn update_slide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    AppJson(req): AppJson<UpdateSlideRequest>,
) -> Result<Json<LandingSlide>, ApiError> {
    let slide = state
        .db
        .update_landing_slide_order(id, req.order)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;
    Ok(Json(slide))
}

pub async fn delete_slide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<String, ApiError> {
    let slide = state
        .db
        .get_landing_slide(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    if let Some(name) = object_name_from_url(&slide.image_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(slide_id = %id, error = %e, "Failed to delete slide blob");
        }
    }

    state
        .db
        .delete_landing_slide(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok("Image deleted successfully".to_string())
}
