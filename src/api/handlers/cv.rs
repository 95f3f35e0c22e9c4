use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use std::sync::Arc;

use super::{collect_multipart, MessageBody};
use crate::api::response::ApiError;
use crate::object_store::{object_name_from_url, unique_name};
use crate::storage::models::CvDocument;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct UploadCvResponse {
    pub message: String,
    pub url: String,
}

pub async fn list_documents(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<CvDocument>>, ApiError> {
    let documents = state
        .db
        .list_cv_documents()
        .map_err(|e| ApiError::internal(e.to_string()))?;
    Ok(Json(documents))
}

pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadCvResponse>, ApiError> {
    let (file, fields) =
        collect_multipart(&mut multipart, "pdf", state.config.max_upload_size).await?;
    let file = file.ok_or_else(|| ApiError::bad_request("No file uploaded."))?;

    let title = fields.get("title").cloned().unwrap_or_default();
    let description = fields.get("description").cloned().unwrap_or_default();

    let name = unique_name(&file.file_name);
    let content_type = file.content_type.as_deref().or(Some("application/pdf"));
    let pdf_url = state
        .object_store
        .put(&name, file.data, content_type)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to store document: {e}")))?;

    match state
        .db
        .insert_cv_document(title, description, pdf_url.clone())
    {
        Ok(document) => {
            tracing::debug!(document_id = %document.id, "Uploaded CV document");
        }
        Err(e) => {
            let _ = state.object_store.delete(&name).await;
            return Err(ApiError::internal(e.to_string()));
        }
    }

    Ok(Json(UploadCvResponse {
        message: "PDF uploaded successfully!".to_string(),
        url: pdf_url,
    }))
}

pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<u64>,
) -> Result<Json<MessageBody>, ApiError> {
    let document = state
        .db
        .get_cv_document(id)
        .map_err(|e| ApiError::internal(e.to_string()))?
        .ok_or_else(|| ApiError::not_found("Document not found"))?;

    if let Some(name) = object_name_from_url(&document.pdf_url) {
        if let Err(e) = state.object_store.delete(name).await {
            tracing::warn!(document_id = %id, error = %e, "Failed to delete document blob");
        }
    }

    state
        .db
        .delete_cv_document(id)
        .map_err(|e| ApiError::internal(e.to_string()))?;

    Ok(Json(MessageBody::new("Document deleted successfully")))
}
