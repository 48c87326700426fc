//! Defines routes for blob record operations.
//!
//! ## Structure
//! - **Collection endpoints** (`/api/DataFile`)
//!   - `GET    /api/DataFile` — list records
//!   - `POST   /api/DataFile` — create from JSON (base64 `data`)
//!   - `PUT    /api/DataFile` — replace the record named by the body's `id`
//!   - `GET    /api/DataFile/search?filename=` — case-insensitive name search
//!   - `POST   /api/DataFile/upload` — multipart single file (`file`)
//!   - `POST   /api/DataFile/upload-multiple` — multipart batch (`files`)
//!
//! - **Record endpoints**
//!   - `GET    /api/DataFile/{id}` — fetch record
//!   - `DELETE /api/DataFile/{id}` — delete (idempotent)
//!   - `PATCH  /api/DataFile/{id}/rename` — change display name
//!   - `GET    /api/DataFile/download/{id}` — raw bytes as an attachment

use crate::{
    handlers::{
        blob_handlers::{
            create_blob, delete_blob, download_blob, get_blob, list_blobs, rename_blob,
            replace_blob, search_blobs, upload_blob, upload_blobs,
        },
        health_handlers::{healthz, readyz},
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
};

/// Build the router. `max_upload_bytes` caps every request body.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Collection routes
        .route(
            "/api/DataFile",
            get(list_blobs).post(create_blob).put(replace_blob),
        )
        .route("/api/DataFile/search", get(search_blobs))
        .route("/api/DataFile/upload", post(upload_blob))
        .route("/api/DataFile/upload-multiple", post(upload_blobs))
        .route("/api/DataFile/download/{id}", get(download_blob))
        // Record routes
        .route("/api/DataFile/{id}", get(get_blob).delete(delete_blob))
        .route("/api/DataFile/{id}/rename", patch(rename_blob))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
