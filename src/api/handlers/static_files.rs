use axum::extract::State;
use axum::http::{header, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use std::path::PathBuf;
use std::sync::Arc;

use crate::api::response::ApiError;
use crate::AppState;

/// Serve blob content stored by the local backend.
/// Route: GET /media/*name
pub async fn serve_media(
    State(state): State<Arc<AppState>>,
    axum::extract::Path(name): axum::extract::Path<String>,
) -> Result<Response, ApiError> {
    // Object names are flat; anything with a path shape is not ours
    if name.contains('/') || name.contains("..") {
        return Err(ApiError::not_found("Object not found"));
    }

    let data = state.object_store.get(&name).await.map_err(|e| match e {
        crate::object_store::ObjectStoreError::NotFound(_) => {
            ApiError::not_found("Object not found")
        }
        _ => ApiError::internal(format!("Failed to retrieve object: {e}")),
    })?;

    let mime_type = mime_guess::from_path(&name).first_or_octet_stream();

    let mut response = (StatusCode::OK, data).into_response();
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    // Objects are immutable once written; only records change
    headers.insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("public, max-age=3600"),
    );

    Ok(response)
}

/// SPA fallback for unmatched GET paths: serve the file under the public
/// directory when it exists, index.html otherwise so client-side routes
/// deep-link correctly.
pub async fn spa_fallback(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    if method != Method::GET {
        return Err(ApiError::not_found("Not found"));
    }

    let path = uri.path().trim_start_matches('/');
    if path.contains("..") {
        return Err(ApiError::not_found("Not found"));
    }

    let public_dir = PathBuf::from(&state.config.server.public_dir);
    let candidate = if path.is_empty() {
        public_dir.join("index.html")
    } else {
        public_dir.join(path)
    };

    let served = match tokio::fs::read(&candidate).await {
        Ok(bytes) => Some((candidate, bytes)),
        Err(_) => {
            let index = public_dir.join("index.html");
            tokio::fs::read(&index).await.ok().map(|bytes| (index, bytes))
        }
    };

    let (file_path, bytes) = served.ok_or_else(|| ApiError::not_found("Not found"))?;
    let mime_type = mime_guess::from_path(&file_path).first_or_octet_stream();

    let mut response = (StatusCode::OK, bytes).into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        mime_type
            .as_ref()
            .parse()
            .unwrap_or(header::HeaderValue::from_static("application/octet-stream")),
    );

    Ok(response)
}
