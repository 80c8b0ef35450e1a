/// Pluggable blob storage backend abstraction.
///
/// Each backend persists opaque blobs under a backend-defined reference:
/// - Postgres: rows in the `blob_data` table, keyed by the versioned hash
/// - Google: objects in a bucket, sharded by hash prefix
/// - Swarm: content-addressed chunks behind a Bee node
///
/// Backends never interpret blob contents. The versioned hash is an
/// opaque caller-supplied identifier; a backend may or may not derive its
/// reference from it.
pub mod google;
pub mod postgres;
pub mod swarm;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// The closed set of backend kinds a manager can hold.
///
/// The `Display` form is the canonical uppercase tag used in aggregate
/// error messages; downstream tooling matches on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlobStorageName {
    Google,
    Postgres,
    Swarm,
}

impl fmt::Display for BlobStorageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Self::Google => "GOOGLE",
            Self::Postgres => "POSTGRES",
            Self::Swarm => "SWARM",
        };
        f.write_str(tag)
    }
}

/// A blob to be stored: caller-supplied versioned hash plus raw contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blob {
    pub versioned_hash: String,
    pub data: Vec<u8>,
}

/// Location of a stored blob: which backend holds it and under which
/// backend-defined reference. A reference returned by one backend is not
/// meaningful to another.
///
/// Doubles as the read descriptor accepted by `get_blob`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobReference {
    pub storage: BlobStorageName,
    pub reference: String,
}

/// Trait for pluggable storage backends.
///
/// Implementations are shared across concurrent manager calls and must be
/// internally thread-safe.
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Stable tag identifying this backend within a manager.
    fn name(&self) -> BlobStorageName;

    /// Persist the blob. Returns the opaque reference under which it can
    /// later be fetched from this backend.
    async fn store(&self, versioned_hash: &str, data: &[u8]) -> Result<String>;

    /// Retrieve previously stored bytes by reference.
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_matches_canonical_tags() {
        assert_eq!(BlobStorageName::Google.to_string(), "GOOGLE");
        assert_eq!(BlobStorageName::Postgres.to_string(), "POSTGRES");
        assert_eq!(BlobStorageName::Swarm.to_string(), "SWARM");
    }

    #[test]
    fn test_serde_tags_match_display() {
        let json = serde_json::to_string(&BlobStorageName::Swarm).unwrap();
        assert_eq!(json, "\"SWARM\"");
        let back: BlobStorageName = serde_json::from_str(&json).unwrap();
        assert_eq!(back, BlobStorageName::Swarm);
    }
}
