//! In-place changes to stored records: rename, full replace, delete.
//!
//! All three report through `MutationOutcome`; storage failures surface as
//! `ServiceError::StorageUnavailable`.

use crate::services::{
    ServiceError, ServiceResult, ensure_id_present,
    ingest_service::build_record,
    repository::{BlobRepository, FieldUpdate, RepositoryError},
};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Updated,
    NotFound,
    Deleted,
}

#[derive(Clone)]
pub struct MutationService {
    repo: Arc<dyn BlobRepository>,
}

impl MutationService {
    pub fn new(repo: Arc<dyn BlobRepository>) -> Self {
        Self { repo }
    }

    /// Change `file_name` only.
    ///
    /// `extension`, `file_hash`, `file_size` and `upload_date` keep the values
    /// derived at ingestion, so the extension can disagree with the new name.
    pub async fn rename(&self, id: &str, new_name: &str) -> ServiceResult<MutationOutcome> {
        ensure_id_present(id)?;
        if new_name.trim().is_empty() {
            return Err(ServiceError::Validation("File name is required".into()));
        }

        let matched = self
            .repo
            .update_field(id, FieldUpdate::FileName(new_name.to_string()))
            .await
            .map_err(ServiceError::StorageUnavailable)?;

        if matched == 0 {
            return Ok(MutationOutcome::NotFound);
        }

        info!("renamed blob {} to {:?}", id, new_name);
        Ok(MutationOutcome::Updated)
    }

    /// Overwrite payload and name of an existing record.
    ///
    /// Size, hash and extension are recomputed from the new payload; any
    /// values the caller supplied for them are discarded. `id` and
    /// `upload_date` are preserved. An unknown id changes nothing.
    pub async fn replace_all(
        &self,
        id: &str,
        data: Option<Vec<u8>>,
        file_name: Option<String>,
    ) -> ServiceResult<MutationOutcome> {
        ensure_id_present(id)?;
        let data = data.ok_or_else(|| ServiceError::Validation("A File is required.".into()))?;

        match self.repo.replace(id, &build_record(data, file_name)).await {
            Ok(()) => {
                info!("replaced blob {}", id);
                Ok(MutationOutcome::Updated)
            }
            Err(RepositoryError::NotFound(_)) => Ok(MutationOutcome::NotFound),
            Err(err) => Err(ServiceError::StorageUnavailable(err)),
        }
    }

    /// Remove a record. Succeeds whether or not the id exists.
    pub async fn delete_by_id(&self, id: &str) -> ServiceResult<MutationOutcome> {
        ensure_id_present(id)?;
        self.repo.delete(id).await?;
        info!("deleted blob {}", id);
        Ok(MutationOutcome::Deleted)
    }
}
