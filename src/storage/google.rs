/// Google Cloud Storage backend over the S3-compatible interoperability API.
///
/// Objects are written to a single bucket under a sharded path derived
/// from the chain id and the blob's versioned hash:
///
///   {chain_id}/{aa}/{bb}/{cc}/{hash-without-0x}.bin
///
/// where `aa`/`bb`/`cc` are the leading hex pairs of the hash. The sharded
/// path is the reference handed back to the manager.
use async_trait::async_trait;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::{BehaviorVersion, Builder as S3ConfigBuilder, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client as S3Client;

use super::{BlobStorage, BlobStorageName};
use crate::error::{BlobStorageError, Result};

/// Configuration for the S3-compatible gateway.
#[derive(Debug, Clone)]
pub struct GoogleConfig {
    /// Interoperability endpoint (e.g., "https://storage.googleapis.com").
    pub endpoint: String,
    /// HMAC access key id.
    pub access_key_id: String,
    /// HMAC secret.
    pub secret_access_key: String,
    /// Target bucket.
    pub bucket: String,
    pub region: String,
}

/// Google object storage backend.
pub struct GoogleStorage {
    client: S3Client,
    bucket: String,
    chain_id: u64,
}

impl GoogleStorage {
    /// Create a backend writing under the given chain id prefix.
    pub fn new(config: &GoogleConfig, chain_id: u64) -> Self {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "google",
        );

        let s3_config = S3ConfigBuilder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(config.region.clone()))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Self {
            client: S3Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            chain_id,
        }
    }

    /// Build the sharded object path for a versioned hash.
    fn blob_path(&self, versioned_hash: &str) -> String {
        let hash = versioned_hash.strip_prefix("0x").unwrap_or(versioned_hash);
        let first = hash.get(0..2).unwrap_or_default();
        let second = hash.get(2..4).unwrap_or_default();
        let third = hash.get(4..6).unwrap_or_default();
        format!("{}/{first}/{second}/{third}/{hash}.bin", self.chain_id)
    }
}

#[async_trait]
impl BlobStorage for GoogleStorage {
    fn name(&self) -> BlobStorageName {
        BlobStorageName::Google
    }

    async fn store(&self, versioned_hash: &str, data: &[u8]) -> Result<String> {
        let path = self.blob_path(versioned_hash);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&path)
            .body(ByteStream::from(data.to_vec()))
            .content_length(data.len() as i64)
            .send()
            .await
            .map_err(|e| BlobStorageError::ObjectStore(e.to_string()))?;

        Ok(path)
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(reference)
            .send()
            .await
            .map_err(|e| {
                let service_err = e.into_service_error();
                if service_err.is_no_such_key() {
                    BlobStorageError::FileNotFound
                } else {
                    BlobStorageError::ObjectStore(service_err.to_string())
                }
            })?;

        let bytes = resp
            .body
            .collect()
            .await
            .map_err(|e| BlobStorageError::ObjectStore(e.to_string()))?
            .into_bytes();

        Ok(bytes.to_vec())
    }
}
