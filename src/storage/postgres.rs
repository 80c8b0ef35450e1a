/// Postgres blob storage.
///
/// Blobs live in the `blob_data` table, keyed by their versioned hash.
/// The returned reference is the versioned hash itself, so a blob can be
/// fetched again knowing only its hash.
///
/// Re-storing the same hash overwrites the existing row.
use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use super::{BlobStorage, BlobStorageName};
use crate::error::{BlobStorageError, Result};

/// Postgres-backed blob storage over a connection pool.
#[derive(Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Connect to Postgres.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Wrap an existing pool shared with other application layers.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run pending migrations (creates `blob_data` on first run).
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| BlobStorageError::Database(e.into()))
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl BlobStorage for PostgresStorage {
    fn name(&self) -> BlobStorageName {
        BlobStorageName::Postgres
    }

    async fn store(&self, versioned_hash: &str, data: &[u8]) -> Result<String> {
        sqlx::query(
            r#"
            INSERT INTO blob_data (versioned_hash, data)
            VALUES ($1, $2)
            ON CONFLICT (versioned_hash) DO UPDATE SET data = EXCLUDED.data
            "#,
        )
        .bind(versioned_hash)
        .bind(data)
        .execute(&self.pool)
        .await?;

        Ok(versioned_hash.to_string())
    }

    async fn fetch(&self, reference: &str) -> Result<Vec<u8>> {
        let row: Option<(Vec<u8>,)> =
            sqlx::query_as("SELECT data FROM blob_data WHERE versioned_hash = $1")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await?;

        row.map(|(data,)| data).ok_or(BlobStorageError::FileNotFound)
    }
}
