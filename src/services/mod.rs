//! Blob store services and the persistence boundary they share.

pub mod hasher;
pub mod ingest_service;
pub mod mutation_service;
pub mod repository;
pub mod retrieval_service;
pub mod sqlite_repository;

use repository::RepositoryError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),
    #[error("blob `{0}` not found")]
    NotFound(String),
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[source] RepositoryError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::StorageUnavailable(other),
        }
    }
}

/// Reject blank ids before they reach the repository.
pub(crate) fn ensure_id_present(id: &str) -> ServiceResult<()> {
    if id.trim().is_empty() {
        return Err(ServiceError::Validation("ID is required".into()));
    }
    Ok(())
}
