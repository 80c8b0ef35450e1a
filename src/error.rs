use thiserror::Error;

use crate::storage::BlobStorageName;

#[derive(Error, Debug)]
pub enum BlobStorageError {
    #[error("No blob storages provided")]
    NoStoragesProvided,

    #[error("Some of the selected storages are not available: {}", selected_names(.0))]
    UnavailableStorages(Vec<BlobStorageName>),

    #[error("Failed to get blob from any of the storages: {}", storage_failures(.0, " - "))]
    AllRetrievesFailed(Vec<StorageError>),

    #[error("Failed to upload blob {} to any of the storages: {}", .versioned_hash, storage_failures(.errors, ": "))]
    AllUploadsFailed {
        versioned_hash: String,
        errors: Vec<StorageError>,
    },

    #[error("File not found")]
    FileNotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Object store error: {0}")]
    ObjectStore(String),

    #[error("Swarm error: {0}")]
    Swarm(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single backend's failure, tagged with the backend it came from.
///
/// Aggregate error variants carry these structured entries; the flat
/// message form is rendered only in `Display`.
#[derive(Debug)]
pub struct StorageError {
    pub storage: BlobStorageName,
    pub error: BlobStorageError,
}

fn selected_names(names: &[BlobStorageName]) -> String {
    names
        .iter()
        .map(|name| name.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn storage_failures(failures: &[StorageError], separator: &str) -> String {
    failures
        .iter()
        .map(|failure| format!("{}{}{}", failure.storage, separator, failure.error))
        .collect::<Vec<_>>()
        .join(", ")
}

pub type Result<T> = std::result::Result<T, BlobStorageError>;
