//! Read paths: lookup by id, filename search, raw content for download.

use crate::{
    models::blob_record::BlobRecord,
    services::{ServiceError, ServiceResult, ensure_id_present, repository::BlobRepository},
};
use futures::TryStreamExt;
use regex::RegexBuilder;
use std::sync::Arc;
use tracing::debug;

/// Payload and display name handed to the download endpoint.
///
/// The whole payload is held in memory; the ingestion size limit bounds it.
#[derive(Debug, Clone)]
pub struct BlobContent {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
}

#[derive(Clone)]
pub struct RetrievalService {
    repo: Arc<dyn BlobRepository>,
}

impl RetrievalService {
    pub fn new(repo: Arc<dyn BlobRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> ServiceResult<Vec<BlobRecord>> {
        let records: Vec<BlobRecord> = self.repo.get_all().try_collect().await?;
        debug!("listed {} records", records.len());
        Ok(records)
    }

    pub async fn get_by_id(&self, id: &str) -> ServiceResult<BlobRecord> {
        ensure_id_present(id)?;
        Ok(self.repo.get_by_id(id).await?)
    }

    /// Case-insensitive regex match against `file_name`.
    ///
    /// A plain word acts as a substring match.
    pub async fn search(&self, pattern: &str) -> ServiceResult<Vec<BlobRecord>> {
        if pattern.is_empty() {
            return Err(ServiceError::Validation(
                "Filename query is required".into(),
            ));
        }

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| ServiceError::Validation(format!("invalid filename pattern: {err}")))?;

        Ok(self.repo.search_by_name_pattern(&regex).await?)
    }

    /// Raw bytes and name for serving as an octet stream. Content is not inspected.
    pub async fn stream_content(&self, id: &str) -> ServiceResult<BlobContent> {
        let record = self.get_by_id(id).await?;
        Ok(BlobContent {
            data: record.data,
            file_name: record.file_name,
        })
    }
}
