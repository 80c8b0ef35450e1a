/// Swarm blob storage via a Bee node's HTTP API.
///
/// Data is uploaded through the `/bytes` endpoint, which returns the
/// content-addressed Swarm reference used for later retrieval. Uploads
/// are paid for with a postage batch; the batch id is part of the config.
///
/// The versioned hash plays no role in the Swarm address; the node derives
/// the reference from the content itself.
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use super::{BlobStorage, BlobStorageName};
use crate::error::{BlobStorageError, Result};

/// Configuration for the Bee HTTP API.
#[derive(Debug, Clone)]
pub struct SwarmConfig {
    /// Bee API endpoint (e.g., "http://localhost:1633").
    pub api_url: String,
    /// Postage batch id paying for uploads.
    pub postage_batch_id: String,
}

/// Swarm storage backend.
pub struct SwarmStorage {
    client: Client,
    config: SwarmConfig,
}

#[derive(Debug, Deserialize)]
struct SwarmUploadResponse {
    reference: String,
}

impl SwarmStorage {
    pub fn new(config: SwarmConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[async_trait]
impl BlobStorage for SwarmStorage {
    fn name(&self) -> BlobStorageName {
        BlobStorageName::Swarm
    }

    async fn store(&self, _versioned_hash: &str, data: &[u8]) -> Result<String> {
        let resp = self
            .client
            .post(format!("{}/bytes", self.config.api_url))
            .header("swarm-postage-batch-id", &self.config.postage_batch_id)
            .header("content-type", "application/octet-stream")
            .body(data.to_vec())
            .send()
            .await?;

        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobStorageError::Swarm(format!(
                "bytes upload failed: {body}"
            )));
        }

        let upload: SwarmUploadResponse = resp.json().await.map_err(|e| {
            BlobStorageError::Serialization(format!("Swarm response parse error: {e}"))
        })?;

        Ok(upload.reference)
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(format!("{}/bytes/{reference}", self.config.api_url))
            .send()
            .await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobStorageError::FileNotFound);
        }
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BlobStorageError::Swarm(format!(
                "bytes download failed: {body}"
            )));
        }

        Ok(resp.bytes().await?.to_vec())
    }
}
