//! Core data model for the blob store.
//!
//! `BlobRecord` maps to the `blob_records` table via `sqlx::FromRow` and
//! serializes as camelCase JSON via `serde`.

pub mod blob_record;
