use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use std::sync::Arc;

use super::{collect_multipart, MessageBody};
use crate::api::response::{ApiError, AppJson};
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::GalleryItem;
use crate::storage::GalleryItemChanges;
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateImageRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub order: Option<u32>,
    pub available: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub reordered_ids: Vec<u64>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GalleryItem>>, ApiError> {
    let images = state
        .db
        .list_gallery()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(images))
}

pub async fn get_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<GalleryItem>, ApiError> {
    let image = state
        .db
        .get_gallery_item(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;
    Ok(Json(image))
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<GalleryItem>), ApiError> {
    let (file, fields) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("Image upload failed"))?;

    let title = fields.get("title").cloned().unwrap_or_default();
    let description = fields.get("description").cloned().unwrap_or_default();

    let name = unique_name(&file.file_name);

    // Phase 1: store the blob
    let image_url = state
        .object_store
        .put(&name, file.data, file.content_type.as_deref())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))?;

    // Phase 2: persist the record, unwinding the blob on failure
    let image = match state.db.insert_gallery_item(image_url, title, description) {
        Ok(image) => image,
        Err(e) => {
            let _ = state.object_store.delete(&name).await;
            return Err(ApiError::internal(e.to_string()));
        }
    };

    tracing::debug!(image_id = %image.id, "Uploaded gallery image");
    Ok((StatusCode::CREATED, Json(image)))
}

pub async fn update_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    AppJson(req): AppJson<UpdateImageRequest>,
) -> Result<String, ApiError> {
    let changes = GalleryItemChanges {
        title: req.title,
        description: req.description,
        order: req.order,
        available: req.available,
    };

    state
        .db
        .update_gallery_item(id, changes)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    Ok("Image description updated successfully".to_string())
}

pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<String, ApiError> {
    let image = state
        .db
        .get_gallery_item(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Image not found"))?;

    // Blob first, best-effort; the row goes regardless
    if let Some(name) = object_name_from_url(&image.image_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(image_id = %id, error = %e, "Failed to delete image blob");
        }
    }

    state
        .db
        .delete_gallery_item(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::debug!(image_id = %id, "Deleted gallery image");
    Ok("Image deleted successfully".to_string())
}

pub async fn reorder_images(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ReorderRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .db
        .reorder_gallery(&req.reordered_ids)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(MessageBody::new("Order updated successfully")))
}
