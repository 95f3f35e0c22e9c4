mod bunny;
mod local;

pub use bunny::BunnyStore;
pub use local::LocalStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Abstraction over blob storage backends. `put` returns the public URL the
/// object is reachable under; that URL is what gets persisted on the record.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, ObjectStoreError>;
    async fn get(&self, name: &str) -> Result<Bytes, ObjectStoreError>;
    async fn delete(&self, name: &str) -> Result<(), ObjectStoreError>;
}

/// Build a unique object name for an upload, keeping a recognizable tail of
/// the original filename.
pub fn unique_name(original: &str) -> String {
    let safe: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    format!("{}-{}", uuid::Uuid::new_v4(), safe)
}

/// Recover the object name from a persisted public URL (its last path
/// segment). Blob deletion keys off this.
pub fn object_name_from_url(url: &str) -> Option<&str> {
    url.rsplit('/').next().filter(|name| !name.is_empty())
}
