use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::{collect_multipart, UploadedFile};
use crate::api::response::ApiError;
use crate::media;
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::{Series, SeriesWork};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

/// A series with its works eagerly attached, the shape the front end renders.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesResponse {
    #[serde(flatten)]
    pub series: Series,
    pub selected_works: Vec<SeriesWork>,
}

impl From<(Series, Vec<SeriesWork>)> for SeriesResponse {
    fn from((series, selected_works): (Series, Vec<SeriesWork>)) -> Self {
        Self {
            series,
            selected_works,
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_series(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SeriesResponse>>, ApiError> {
    let series = state
        .db
        .list_series_with_works()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(series.into_iter().map(SeriesResponse::from).collect()))
}

pub async fn get_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SeriesResponse>, ApiError> {
    let series = state
        .db
        .get_series_with_works(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected series not found"))?;
    Ok(Json(series.into()))
}

pub async fn create_series(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Series>), ApiError> {
    let (file, fields) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;

    let name = fields
        .get("name")
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| ApiError::bad_request("Series name is required"))?;

    let image_url = match file {
        Some(file) => Some(store_series_image(&state, file).await?),
        None => None,
    };

    let series = state
        .db
        .insert_series(name, image_url)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    tracing::debug!(series_id = %series.id, "Created selected series");
    Ok((StatusCode::CREATED, Json(series)))
}

/// Partial update: a name-only edit leaves the image alone, an image-only
/// edit leaves the name alone.
pub async fn update_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    mut multipart: Multipart,
) -> Result<Json<Series>, ApiError> {
    let (file, fields) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;

    let name = fields
        .get("name")
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let image_url = match file {
        Some(file) => Some(store_series_image(&state, file).await?),
        None => None,
    };

    let series = state
        .db
        .update_series(id, name, image_url)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected series not found"))?;

    Ok(Json(series))
}

/// Delete a series and everything under it: the series blob, the child rows,
/// and each child's blob.
pub async fn delete_series(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<String, ApiError> {
    let (series, works) = state
        .db
        .delete_series(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected series not found"))?;

    if let Some(name) = series.image_url.as_deref().and_then(object_name_from_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(series_id = %id, error = %e, "Failed to delete series blob");
        }
    }

    for work in &works {
        if let Some(name) = object_name_from_url(&work.image_url) {
            if let Err(e) = state.object_store.delete(name).await {
                tracing::warn!(work_id = %work.id, error = %e, "Failed to delete work blob");
            }
        }
    }

    tracing::debug!(series_id = %id, works = works.len(), "Deleted selected series");
    Ok("Selected series deleted successfully".to_string())
}

// ============================================================================
// Helpers
// ============================================================================

/// Series tiles are recompressed before they hit the store.
async fn store_series_image(
    state: &Arc<AppState>,
    file: UploadedFile,
) -> Result<String, ApiError> {
    let data = file.data.clone();
    let compressed = tokio::task::spawn_blocking(move || media::recompress(&data))
        .await
        .map_err(|e| ApiError::internal(format!("Recompression task failed: {e}")))?
        .map_err(|_| ApiError::bad_request("File content is not a decodable image"))?;

    let name = unique_name(&media::recompressed_name(&file.file_name));
    state
        .object_store
        .put(&name, compressed.into(), Some("image/jpeg"))
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))
}
