//! src/services/sqlite_repository.rs
//!
//! SQLite implementation of `BlobRepository`. Each record is one row in
//! `blob_records`, payload and metadata together, keyed by a UUID string.

use crate::{
    models::blob_record::{BlobRecord, NewBlobRecord},
    services::repository::{BlobRepository, FieldUpdate, RepositoryError, RepositoryResult},
};
use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt, stream::BoxStream};
use regex::Regex;
use sqlx::{QueryBuilder, SqlitePool, sqlite::Sqlite};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

const MIGRATION_SQL: &str = include_str!("../../migrations/0001_init.sql");

/// Upper bound on bound parameters per `IN (...)` query.
const ID_CHUNK: usize = 500;

const SELECT_COLUMNS: &str =
    "SELECT id, data, file_name, extension, file_size, upload_date, file_hash FROM blob_records";

#[derive(Clone)]
pub struct SqliteBlobRepository {
    /// Shared SQLite connection pool, safe for concurrent use.
    pub db: Arc<SqlitePool>,
}

impl SqliteBlobRepository {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Apply the embedded schema. Every statement is idempotent.
    pub async fn run_migrations(&self) -> RepositoryResult<()> {
        let statements = MIGRATION_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BlobRepository for SqliteBlobRepository {
    async fn insert(&self, record: &NewBlobRecord) -> RepositoryResult<String> {
        let id = Uuid::new_v4().to_string();

        sqlx::query(
            "INSERT INTO blob_records (
                id, data, file_name, extension, file_size, upload_date, file_hash
             ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(record.data.as_slice())
        .bind(record.file_name.as_deref())
        .bind(record.extension.as_deref())
        .bind(record.file_size)
        .bind(record.upload_date)
        .bind(record.file_hash.as_deref())
        .execute(&*self.db)
        .await?;

        debug!("inserted blob record {}", id);
        Ok(id)
    }

    async fn get_by_id(&self, id: &str) -> RepositoryResult<BlobRecord> {
        sqlx::query_as::<_, BlobRecord>(&format!("{SELECT_COLUMNS} WHERE id = ?"))
            .bind(id)
            .fetch_one(&*self.db)
            .await
            .map_err(|err| match err {
                sqlx::Error::RowNotFound => RepositoryError::NotFound(id.to_string()),
                other => RepositoryError::StorageUnavailable(other),
            })
    }

    fn get_all(&self) -> BoxStream<'_, RepositoryResult<BlobRecord>> {
        sqlx::query_as::<_, BlobRecord>(
            "SELECT id, data, file_name, extension, file_size, upload_date, file_hash
             FROM blob_records ORDER BY rowid ASC",
        )
        .fetch(&*self.db)
        .map_err(RepositoryError::from)
        .boxed()
    }

    async fn search_by_name_pattern(&self, pattern: &Regex) -> RepositoryResult<Vec<BlobRecord>> {
        // Match names first so payloads are only loaded for hits.
        let candidates: Vec<(String, String)> = sqlx::query_as(
            "SELECT id, file_name FROM blob_records
             WHERE file_name IS NOT NULL ORDER BY rowid ASC",
        )
        .fetch_all(&*self.db)
        .await?;

        let ids: Vec<String> = candidates
            .into_iter()
            .filter(|(_, name)| pattern.is_match(name))
            .map(|(id, _)| id)
            .collect();

        debug!("pattern `{}` matched {} records", pattern, ids.len());

        let mut records = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(ID_CHUNK) {
            let mut builder = QueryBuilder::<Sqlite>::new(SELECT_COLUMNS);
            builder.push(" WHERE id IN (");
            let mut separated = builder.separated(", ");
            for id in chunk {
                separated.push_bind(id.clone());
            }
            separated.push_unseparated(") ORDER BY rowid ASC");

            let rows: Vec<BlobRecord> = builder.build_query_as().fetch_all(&*self.db).await?;
            records.extend(rows);
        }

        Ok(records)
    }

    async fn replace(&self, id: &str, record: &NewBlobRecord) -> RepositoryResult<()> {
        let result = sqlx::query(
            "UPDATE blob_records
             SET data = ?, file_name = ?, extension = ?, file_size = ?, file_hash = ?
             WHERE id = ?",
        )
        .bind(record.data.as_slice())
        .bind(record.file_name.as_deref())
        .bind(record.extension.as_deref())
        .bind(record.file_size)
        .bind(record.file_hash.as_deref())
        .bind(id)
        .execute(&*self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn update_field(&self, id: &str, update: FieldUpdate) -> RepositoryResult<u64> {
        let result = match update {
            FieldUpdate::FileName(name) => {
                sqlx::query("UPDATE blob_records SET file_name = ? WHERE id = ?")
                    .bind(name)
                    .bind(id)
                    .execute(&*self.db)
                    .await?
            }
        };

        Ok(result.rows_affected())
    }

    async fn delete(&self, id: &str) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM blob_records WHERE id = ?")
            .bind(id)
            .execute(&*self.db)
            .await?;

        if result.rows_affected() == 0 {
            debug!("delete of {} matched nothing", id);
        }

        Ok(())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::memory_repository;
    use chrono::{Duration, Utc};
    use regex::RegexBuilder;

    fn new_record(data: &[u8], name: Option<&str>) -> NewBlobRecord {
        NewBlobRecord {
            data: data.to_vec(),
            file_name: name.map(str::to_string),
            extension: None,
            file_size: data.len() as i64,
            upload_date: Utc::now(),
            file_hash: Some("hash".into()),
        }
    }

    fn pattern(p: &str) -> Regex {
        RegexBuilder::new(p).case_insensitive(true).build().unwrap()
    }

    #[tokio::test]
    async fn insert_assigns_fresh_ids_even_for_identical_content() {
        let repo = memory_repository().await;
        let a = repo.insert(&new_record(b"same", Some("a"))).await.unwrap();
        let b = repo.insert(&new_record(b"same", Some("a"))).await.unwrap();
        assert_ne!(a, b);

        let stored = repo.get_by_id(&a).await.unwrap();
        assert_eq!(stored.data, b"same");
        assert_eq!(stored.file_hash.as_deref(), Some("hash"));
    }

    #[tokio::test]
    async fn get_by_unknown_id_is_not_found() {
        let repo = memory_repository().await;
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(id) if id == "missing"));
    }

    #[tokio::test]
    async fn get_all_streams_in_insertion_order() {
        let repo = memory_repository().await;
        let first = repo.insert(&new_record(b"1", Some("one"))).await.unwrap();
        let second = repo.insert(&new_record(b"2", None)).await.unwrap();

        let all: Vec<BlobRecord> = repo.get_all().try_collect().await.unwrap();
        let ids: Vec<_> = all.iter().map(|r| r.id.clone()).collect();
        assert_eq!(ids, vec![first, second]);
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_skips_unnamed() {
        let repo = memory_repository().await;
        let hit = repo
            .insert(&new_record(b"q1", Some("Q1_Report.pdf")))
            .await
            .unwrap();
        repo.insert(&new_record(b"inv", Some("invoice.pdf")))
            .await
            .unwrap();
        repo.insert(&new_record(b"anon", None)).await.unwrap();

        let found = repo
            .search_by_name_pattern(&pattern("report"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, hit);

        let everything_named = repo.search_by_name_pattern(&pattern(".*")).await.unwrap();
        assert_eq!(everything_named.len(), 2);
    }

    #[tokio::test]
    async fn replace_keeps_upload_date_and_rejects_unknown_ids() {
        let repo = memory_repository().await;
        let mut original = new_record(b"old", Some("old.txt"));
        original.upload_date = Utc::now() - Duration::days(3);
        let id = repo.insert(&original).await.unwrap();
        let before = repo.get_by_id(&id).await.unwrap();

        repo.replace(&id, &new_record(b"new content", Some("new.txt")))
            .await
            .unwrap();
        let after = repo.get_by_id(&id).await.unwrap();
        assert_eq!(after.data, b"new content");
        assert_eq!(after.file_name.as_deref(), Some("new.txt"));
        assert_eq!(after.upload_date, before.upload_date);

        let err = repo
            .replace("missing", &new_record(b"x", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert!(matches!(
            repo.get_by_id("missing").await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn update_field_reports_matched_count() {
        let repo = memory_repository().await;
        let id = repo.insert(&new_record(b"x", Some("a.txt"))).await.unwrap();

        let matched = repo
            .update_field(&id, FieldUpdate::FileName("b.txt".into()))
            .await
            .unwrap();
        assert_eq!(matched, 1);

        let missing = repo
            .update_field("missing", FieldUpdate::FileName("b.txt".into()))
            .await
            .unwrap();
        assert_eq!(missing, 0);
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let repo = memory_repository().await;
        let id = repo.insert(&new_record(b"x", None)).await.unwrap();

        repo.delete(&id).await.unwrap();
        repo.delete(&id).await.unwrap();
        assert!(matches!(
            repo.get_by_id(&id).await,
            Err(RepositoryError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn health_check_succeeds_on_open_pool() {
        let repo = memory_repository().await;
        repo.health_check().await.unwrap();
    }
}
