use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{ObjectStore, ObjectStoreError};

/// Local filesystem object store for development and testing. Objects are
/// served back through the service's own `/media/*name` route, so public
/// URLs point at the configured base URL.
pub struct LocalStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(
        base_path: P,
        public_base_url: &str,
    ) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn object_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        _content_type: Option<&str>,
    ) -> Result<String, ObjectStoreError> {
        let path = self.object_path(name);
        tokio::fs::write(&path, &data).await?;
        Ok(format!("{}/media/{}", self.public_base_url, name))
    }

    async fn get(&self, name: &str) -> Result<Bytes, ObjectStoreError> {
        let path = self.object_path(name);
        if !path.exists() {
            return Err(ObjectStoreError::NotFound(name.to_string()));
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Bytes::from(data))
    }

    async fn delete(&self, name: &str) -> Result<(), ObjectStoreError> {
        let path = self.object_path(name);
        if path.exists() {
            tokio::fs::remove_file(&path).await?;
        }
        Ok(())
    }
}
