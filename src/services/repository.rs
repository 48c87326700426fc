//! Persistence boundary for blob records.
//!
//! Services depend only on `BlobRepository`; the concrete store is chosen
//! in `main` and shared as one `Arc<dyn BlobRepository>`.

use crate::models::blob_record::{BlobRecord, NewBlobRecord};
use async_trait::async_trait;
use futures::stream::BoxStream;
use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("record `{0}` not found")]
    NotFound(String),
    #[error(transparent)]
    StorageUnavailable(#[from] sqlx::Error),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// A single-field partial update.
#[derive(Debug, Clone)]
pub enum FieldUpdate {
    /// Set `file_name` only; derived fields are left as they are.
    FileName(String),
}

#[async_trait]
pub trait BlobRepository: Send + Sync {
    /// Persist a record and return its newly assigned id.
    ///
    /// Identical content is stored again under a new id.
    async fn insert(&self, record: &NewBlobRecord) -> RepositoryResult<String>;

    /// Fetch one record, or `NotFound`.
    async fn get_by_id(&self, id: &str) -> RepositoryResult<BlobRecord>;

    /// Lazily stream every record. The stream is consumed once.
    fn get_all(&self) -> BoxStream<'_, RepositoryResult<BlobRecord>>;

    /// Records whose `file_name` matches `pattern`. Unnamed records never match.
    async fn search_by_name_pattern(&self, pattern: &Regex) -> RepositoryResult<Vec<BlobRecord>>;

    /// Overwrite the record stored under `id`, keeping `id` and `upload_date`.
    ///
    /// Fails with `NotFound` when no record matches; nothing is created.
    async fn replace(&self, id: &str, record: &NewBlobRecord) -> RepositoryResult<()>;

    /// Apply a partial update and return the number of matched records (0 or 1).
    async fn update_field(&self, id: &str, update: FieldUpdate) -> RepositoryResult<u64>;

    /// Remove the record if present. Deleting an absent id is not an error.
    async fn delete(&self, id: &str) -> RepositoryResult<()>;

    /// Cheap round-trip to the backing store.
    async fn health_check(&self) -> RepositoryResult<()>;
}
