use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use super::{collect_multipart, MessageBody};
use crate::api::response::{ApiError, AppJson};
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::{Patch, SeriesWork};
use crate::storage::{NewWork, WorkChanges};
use crate::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub image_url: String,
    #[serde(default)]
    pub order: Option<u32>,
    #[serde(default)]
    pub selected_series_id: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub available: Option<bool>,
    /// Missing = keep, null = detach from its series, number = reparent.
    #[serde(default, deserialize_with = "nullable")]
    pub selected_series_id: Option<Option<u64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderRequest {
    pub reordered_ids: Vec<u64>,
}

/// Distinguishes between a missing field (`None`) and an explicit `null` (`Some(None)`).
fn nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: DeserializeOwned,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn list_works(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<SeriesWork>>, ApiError> {
    let works = state
        .db
        .list_works()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(works))
}

pub async fn list_works_by_series(
    State(state): State<Arc<AppState>>,
    Path(selected_series_id): Path<u64>,
) -> Result<Json<Vec<SeriesWork>>, ApiError> {
    let works = state
        .db
        .list_works_by_series(selected_series_id)
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(works))
}

pub async fn get_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<SeriesWork>, ApiError> {
    let work = state
        .db
        .get_work(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected work not found"))?;
    Ok(Json(work))
}

/// JSON create for works whose image already lives in the store.
pub async fn create_work(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<CreateWorkRequest>,
) -> Result<(StatusCode, Json<SeriesWork>), ApiError> {
    if req.title.trim().is_empty() {
        return Err(ApiError::bad_request("Work title is required"));
    }

    let work = state
        .db
        .insert_work(NewWork {
            title: req.title,
            description: req.description,
            image_url: req.image_url,
            order: req.order,
            selected_series_id: req.selected_series_id,
        })
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(work)))
}

/// Multipart create: stores the image, then the row.
pub async fn upload_work(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<SeriesWork>), ApiError> {
    let (file, fields) =
        collect_multipart(&mut multipart, "image", state.config.max_upload_size).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("Image upload failed"))?;

    let title = fields.get("title").cloned().unwrap_or_default();
    let description = fields.get("description").cloned().unwrap_or_default();
    let selected_series_id = match fields.get("selectedSeriesId") {
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| ApiError::bad_request("Invalid selectedSeriesId"))?,
        ),
        None => None,
    };

    let name = unique_name(&file.file_name);
    let image_url = state
        .object_store
        .put(&name, file.data, file.content_type.as_deref())
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store image: {e}")))?;

    let work = match state.db.insert_work(NewWork {
        title,
        description,
        image_url,
        order: None,
        selected_series_id,
    }) {
        Ok(work) => work,
        Err(e) => {
            let _ = state.object_store.delete(&name).await;
            return Err(ApiError::internal(e.to_string()));
        }
    };

    tracing::debug!(work_id = %work.id, "Uploaded selected work");
    Ok((StatusCode::CREATED, Json(work)))
}

pub async fn update_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
    AppJson(req): AppJson<UpdateWorkRequest>,
) -> Result<Json<SeriesWork>, ApiError> {
    let changes = WorkChanges {
        title: req.title,
        description: req.description,
        image_url: req.image_url,
        available: req.available,
        selected_series_id: Patch::from(req.selected_series_id),
    };

    let work = state
        .db
        .update_work(id, changes)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected work not found"))?;

    Ok(Json(work))
}

pub async fn delete_work(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<String, ApiError> {
    let work = state
        .db
        .get_work(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Selected work not found"))?;

    if let Some(name) = object_name_from_url(&work.image_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(work_id = %id, error = %e, "Failed to delete work blob");
        }
    }

    state
        .db
        .delete_work(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok("Selected work deleted successfully".to_string())
}

pub async fn reorder_works(
    State(state): State<Arc<AppState>>,
    AppJson(req): AppJson<ReorderRequest>,
) -> Result<Json<MessageBody>, ApiError> {
    state
        .db
        .reorder_works(&req.reordered_ids)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(MessageBody::new("Order updated successfully")))
}
