//! Shared application state handed to every handler.

use crate::services::{
    ingest_service::IngestService, mutation_service::MutationService,
    repository::BlobRepository, retrieval_service::RetrievalService,
};
use std::sync::Arc;

/// Services wired to one repository handle for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub retrieval: RetrievalService,
    pub mutation: MutationService,
    pub repo: Arc<dyn BlobRepository>,
}

impl AppState {
    pub fn new(repo: Arc<dyn BlobRepository>) -> Self {
        Self {
            ingest: IngestService::new(repo.clone()),
            retrieval: RetrievalService::new(repo.clone()),
            mutation: MutationService::new(repo.clone()),
            repo,
        }
    }
}
