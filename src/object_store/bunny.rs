use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Client;

use super::{ObjectStore, ObjectStoreError};

/// Bunny.net storage-zone backend. Writes go to the storage endpoint with an
/// `AccessKey` header; reads are served publicly from the pull-zone domain.
pub struct BunnyStore {
    client: Client,
    storage_zone: String,
    access_key: String,
    endpoint: String,
    cdn_domain: String,
}

impl BunnyStore {
    pub fn new(
        storage_zone: &str,
        access_key: &str,
        endpoint: &str,
        cdn_domain: &str,
    ) -> Result<Self, anyhow::Error> {
        let client = Client::builder().build()?;

        Ok(Self {
            client,
            storage_zone: storage_zone.to_string(),
            access_key: access_key.to_string(),
            endpoint: endpoint.to_string(),
            cdn_domain: cdn_domain.to_string(),
        })
    }

    fn storage_url(&self, name: &str) -> String {
        format!(
            "https://{}/{}/{}",
            self.endpoint, self.storage_zone, name
        )
    }

    fn public_url(&self, name: &str) -> String {
        format!("https://{}/{}", self.cdn_domain, name)
    }
}

#[async_trait]
impl ObjectStore for BunnyStore {
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: Option<&str>,
    ) -> Result<String, ObjectStoreError> {
        let mut request = self
            .client
            .put(self.storage_url(name))
            .header("AccessKey", &self.access_key)
            .body(data);

        if let Some(content_type) = content_type {
            request = request.header("Content-Type", content_type.to_string());
        }

        let resp = request
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(format!(
                "Bunny upload failed ({status}): {body}"
            )));
        }

        Ok(self.public_url(name))
    }

    async fn get(&self, name: &str) -> Result<Bytes, ObjectStoreError> {
        let resp = self
            .client
            .get(self.storage_url(name))
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(ObjectStoreError::NotFound(name.to_string()));
        }

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(format!(
                "Bunny download failed ({status}): {body}"
            )));
        }

        let data = resp
            .bytes()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        Ok(data)
    }

    async fn delete(&self, name: &str) -> Result<(), ObjectStoreError> {
        let resp = self
            .client
            .delete(self.storage_url(name))
            .header("AccessKey", &self.access_key)
            .send()
            .await
            .map_err(|e| ObjectStoreError::Backend(e.to_string()))?;

        // 404 is fine -- object already gone
        if !resp.status().is_success() && resp.status() != reqwest::StatusCode::NOT_FOUND {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(ObjectStoreError::Backend(format!(
                "Bunny delete failed ({status}): {body}"
            )));
        }

        Ok(())
    }
}
