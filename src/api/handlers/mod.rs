mod admin;
mod auth;
mod contact;
mod cv;
mod gallery;
mod landing;
mod profile;
mod series;
mod static_files;
mod works;

use std::collections::HashMap;

use axum::extract::Multipart;
use bytes::Bytes;
use serde::Serialize;

use crate::api::response::ApiError;

pub use admin::{admin_purge, dashboard, health};
pub use auth::{login, register};
pub use contact::send_email;
pub use cv::{delete_document, list_documents, upload_document};
pub use gallery::{delete_image, get_image, list_images, reorder_images, update_image, upload_image};
pub use landing::{create_slide, delete_slide, list_slides, update_slide};
pub use profile::{
    delete_profile_picture, get_background_image, get_bio, list_profile_pictures,
    set_background_image, update_bio, upload_profile_picture,
};
pub use series::{create_series, delete_series, get_series, list_series, update_series};
pub use static_files::{serve_media, spa_fallback};
pub use works::{
    create_work, delete_work, get_work, list_works, list_works_by_series, reorder_works,
    update_work, upload_work,
};

/// `{ "message": ... }` confirmation body used by several write routes.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

impl MessageBody {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A file part pulled out of a multipart form.
pub(crate) struct UploadedFile {
    pub data: Bytes,
    pub file_name: String,
    pub content_type: Option<String>,
}

/// Drain a multipart form into the file part named `file_field` plus the
/// remaining text fields. Unknown fields are ignored.
pub(crate) async fn collect_multipart(
    multipart: &mut Multipart,
    file_field: &str,
    max_size: u64,
) -> Result<(Option<UploadedFile>, HashMap<String, String>), ApiError> {
    let mut file: Option<UploadedFile> = None;
    let mut fields = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Invalid multipart data: {e}")))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == file_field {
            let file_name = field.file_name().unwrap_or("upload").to_string();
            let content_type = field.content_type().map(|s| s.to_string());

            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read file: {e}")))?;

            if data.len() as u64 > max_size {
                return Err(ApiError::payload_too_large(format!(
                    "File exceeds maximum upload size of {max_size} bytes"
                )));
            }

            if data.is_empty() {
                return Err(ApiError::bad_request("Empty file"));
            }

            file = Some(UploadedFile {
                data,
                file_name,
                content_type,
            });
        } else {
            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid {field_name}: {e}")))?;
            fields.insert(field_name, value);
        }
    }

    Ok((file, fields))
}
