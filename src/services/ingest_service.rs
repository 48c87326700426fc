//! src/services/ingest_service.rs
//!
//! Ingestion: validate payloads, derive metadata, persist new records.
//! Batch ingestion is best-effort: each item stands alone and a failure never
//! aborts or rolls back the rest of the batch.

use crate::{
    models::blob_record::{BlobRecord, NewBlobRecord},
    services::{ServiceError, ServiceResult, hasher::fingerprint, repository::BlobRepository},
};
use bytes::Bytes;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Fields computed from a payload and its name.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetadata {
    pub extension: Option<String>,
    pub file_size: i64,
    pub file_hash: String,
}

/// Compute every derived field for `data` stored under `file_name`.
///
/// Used wherever `data` is set so the hash and size always describe the
/// bytes actually stored.
pub fn derive_metadata(data: &[u8], file_name: Option<&str>) -> DerivedMetadata {
    DerivedMetadata {
        extension: file_name.and_then(file_extension),
        file_size: data.len() as i64,
        file_hash: fingerprint(data),
    }
}

/// Extension of the last path component, including the dot.
///
/// `"dir/report.final.pdf"` yields `".pdf"`; names without a dot, or ending
/// in one, have no extension.
pub fn file_extension(name: &str) -> Option<String> {
    let base = name.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(name);
    match base.rfind('.') {
        Some(pos) if pos + 1 < base.len() => Some(base[pos..].to_string()),
        _ => None,
    }
}

/// Build a record ready for insert or replace from raw bytes and a name.
pub fn build_record(data: Vec<u8>, file_name: Option<String>) -> NewBlobRecord {
    let derived = derive_metadata(&data, file_name.as_deref());
    NewBlobRecord {
        data,
        file_name,
        extension: derived.extension,
        file_size: derived.file_size,
        upload_date: Utc::now(),
        file_hash: Some(derived.file_hash),
    }
}

/// One part of a multi-file submission.
#[derive(Debug, Clone)]
pub struct IngestItem {
    pub data: Bytes,
    pub file_name: Option<String>,
}

/// Result of a best-effort batch.
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IngestOutcome {
    /// Ids of items that were stored, in submission order.
    pub succeeded: Vec<String>,
    /// Items ignored because they carried no bytes.
    pub skipped: usize,
    /// Items that could not be persisted.
    pub failed: usize,
}

#[derive(Clone)]
pub struct IngestService {
    repo: Arc<dyn BlobRepository>,
}

impl IngestService {
    pub fn new(repo: Arc<dyn BlobRepository>) -> Self {
        Self { repo }
    }

    /// Store a single uploaded file. Empty payloads are rejected.
    pub async fn ingest_one(
        &self,
        data: Bytes,
        declared_name: Option<String>,
    ) -> ServiceResult<BlobRecord> {
        if data.is_empty() {
            return Err(ServiceError::Validation("File is required.".into()));
        }
        self.persist(build_record(data.to_vec(), declared_name)).await
    }

    /// Store every non-empty item independently.
    ///
    /// Empty items are skipped and persistence failures are counted, not
    /// returned; items stored before a failure stay stored.
    pub async fn ingest_many(&self, items: Vec<IngestItem>) -> IngestOutcome {
        let mut outcome = IngestOutcome::default();

        for item in items {
            if item.data.is_empty() {
                debug!("skipping empty part {:?}", item.file_name);
                outcome.skipped += 1;
                continue;
            }

            let name = item.file_name.clone();
            match self.ingest_one(item.data, item.file_name).await {
                Ok(record) => outcome.succeeded.push(record.id),
                Err(err) => {
                    warn!("failed to ingest {:?}: {}", name, err);
                    outcome.failed += 1;
                }
            }
        }

        info!(
            "batch ingest: {} stored, {} skipped, {} failed",
            outcome.succeeded.len(),
            outcome.skipped,
            outcome.failed
        );
        outcome
    }

    /// Metadata-only create: the caller supplies the payload inline.
    ///
    /// `data` must be present but may be empty.
    pub async fn create(
        &self,
        data: Option<Vec<u8>>,
        file_name: Option<String>,
    ) -> ServiceResult<BlobRecord> {
        let data = data.ok_or_else(|| ServiceError::Validation("A File is required.".into()))?;
        self.persist(build_record(data, file_name)).await
    }

    async fn persist(&self, record: NewBlobRecord) -> ServiceResult<BlobRecord> {
        let id = self.repo.insert(&record).await?;
        info!(
            "stored blob {} ({:?}, {} bytes)",
            id, record.file_name, record.file_size
        );
        Ok(record.with_id(id))
    }
}
