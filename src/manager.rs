/// Blob storage dispatcher.
///
/// The manager owns a fixed, named collection of storage backends and fans
/// every operation out across them concurrently:
/// - reads return the first backend that produces the blob
/// - writes run on every target and succeed if at least one backend accepts
///
/// Per-backend failures are never raised directly. They are either
/// aggregated into a composite error (all-failed case) or preserved as
/// structured entries in the store result (partial-success case), so
/// callers always see the complete picture of a fan-out's outcome.
use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use futures::stream::{FuturesUnordered, StreamExt};
use tracing::{info, warn};

use crate::error::{BlobStorageError, Result, StorageError};
use crate::storage::{Blob, BlobReference, BlobStorage, BlobStorageName};

/// A blob returned by a successful read, tagged with the backend that
/// produced it.
#[derive(Debug)]
pub struct RetrievedBlob {
    pub storage: BlobStorageName,
    pub data: Vec<u8>,
}

/// Options recognized by `store_blob`.
#[derive(Debug, Clone, Default)]
pub struct StoreOptions {
    /// Restricts the write fan-out to these backends. `None` means all
    /// registered backends.
    pub selected_storages: Option<Vec<BlobStorageName>>,
}

/// Aggregate outcome of a write fan-out.
///
/// A partial success (some references, some errors) is a normal return;
/// the caller inspects `errors` to decide policy.
#[derive(Debug)]
pub struct StoreResult {
    /// One entry per backend that accepted the blob. Non-empty.
    pub references: Vec<BlobReference>,
    /// One entry per backend that failed.
    pub errors: Vec<StorageError>,
}

/// Dispatcher over a named collection of storage backends.
///
/// Stateless after construction: the backend map is read-only and backends
/// are shared across concurrent calls.
pub struct BlobStorageManager {
    backends: HashMap<BlobStorageName, Arc<dyn BlobStorage>>,
    chain_id: u64,
}

impl std::fmt::Debug for BlobStorageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobStorageManager")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

impl BlobStorageManager {
    /// Create a manager over the given backends. Membership is fixed for
    /// the manager's lifetime.
    pub fn new(
        backends: HashMap<BlobStorageName, Arc<dyn BlobStorage>>,
        chain_id: u64,
    ) -> Result<Self> {
        if backends.is_empty() {
            return Err(BlobStorageError::NoStoragesProvided);
        }

        Ok(Self { backends, chain_id })
    }

    /// The chain id this manager was constructed with. Carried verbatim;
    /// not interpreted at this layer.
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Look up the backend registered under `name`.
    pub fn get_storage(&self, name: BlobStorageName) -> Option<Arc<dyn BlobStorage>> {
        self.backends.get(&name).cloned()
    }

    /// Fetch a blob from the first backend that returns it.
    ///
    /// All surviving descriptors are fetched concurrently; the first
    /// success wins and outstanding fetches are cancelled by drop. Which
    /// backend wins among concurrent successes is unspecified.
    ///
    /// Descriptors naming a backend this manager does not hold cannot
    /// succeed; they are skipped and surface as `File not found` entries
    /// in the aggregate error if every attempt fails.
    pub async fn get_blob(&self, references: &[BlobReference]) -> Result<RetrievedBlob> {
        let mut failures = Vec::new();
        let mut fetches = FuturesUnordered::new();

        for blob_ref in references {
            match self.backends.get(&blob_ref.storage) {
                Some(backend) => {
                    let backend = Arc::clone(backend);
                    let storage = blob_ref.storage;
                    let reference = blob_ref.reference.clone();
                    fetches.push(async move { (storage, backend.fetch(&reference).await) });
                }
                None => failures.push(StorageError {
                    storage: blob_ref.storage,
                    error: BlobStorageError::FileNotFound,
                }),
            }
        }

        while let Some((storage, outcome)) = fetches.next().await {
            match outcome {
                Ok(data) => {
                    info!(storage = %storage, size = data.len(), "Blob retrieved");
                    return Ok(RetrievedBlob { storage, data });
                }
                Err(error) => {
                    warn!(storage = %storage, error = %error, "Blob fetch failed");
                    failures.push(StorageError { storage, error });
                }
            }
        }

        Err(BlobStorageError::AllRetrievesFailed(failures))
    }

    /// Store a blob on every target backend concurrently.
    ///
    /// Writes never short-circuit: every target runs to completion so the
    /// blob lands on as many backends as possible. At least one backend
    /// must accept the blob; otherwise the call fails with the aggregated
    /// per-backend errors.
    pub async fn store_blob(&self, blob: &Blob, options: &StoreOptions) -> Result<StoreResult> {
        let targets: Vec<Arc<dyn BlobStorage>> = match &options.selected_storages {
            Some(selected) => {
                let missing: Vec<BlobStorageName> = selected
                    .iter()
                    .copied()
                    .filter(|name| !self.backends.contains_key(name))
                    .collect();
                if !missing.is_empty() {
                    return Err(BlobStorageError::UnavailableStorages(missing));
                }

                selected
                    .iter()
                    .filter_map(|name| self.backends.get(name))
                    .cloned()
                    .collect()
            }
            None => self.backends.values().cloned().collect(),
        };

        info!(
            versioned_hash = %blob.versioned_hash,
            targets = targets.len(),
            "Storing blob"
        );

        let uploads = targets.iter().map(|backend| {
            let backend = Arc::clone(backend);
            let versioned_hash = blob.versioned_hash.clone();
            let data = blob.data.clone();
            async move { (backend.name(), backend.store(&versioned_hash, &data).await) }
        });

        let mut references = Vec::new();
        let mut errors = Vec::new();
        for (storage, outcome) in join_all(uploads).await {
            match outcome {
                Ok(reference) => references.push(BlobReference { storage, reference }),
                Err(error) => {
                    warn!(storage = %storage, error = %error, "Blob upload failed");
                    errors.push(StorageError { storage, error });
                }
            }
        }

        if references.is_empty() {
            return Err(BlobStorageError::AllUploadsFailed {
                versioned_hash: blob.versioned_hash.clone(),
                errors,
            });
        }

        info!(
            versioned_hash = %blob.versioned_hash,
            stored = references.len(),
            failed = errors.len(),
            "Blob stored"
        );

        Ok(StoreResult { references, errors })
    }
}
