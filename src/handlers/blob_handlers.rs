//! HTTP handlers for blob records under `/api/DataFile`.
//! Translate requests into service calls; all storage decisions live in the
//! services.

use crate::{
    errors::AppError,
    models::blob_record::{BlobRecord, BlobRecordPayload, RenameRequest},
    services::{
        ingest_service::{IngestItem, IngestOutcome},
        mutation_service::MutationOutcome,
    },
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State, multipart::MultipartError},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Query params accepted by `GET /api/DataFile/search`.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub filename: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadManyResponse {
    pub message: &'static str,
    #[serde(flatten)]
    pub outcome: IngestOutcome,
}

/// GET `/api/DataFile` — every stored record.
pub async fn list_blobs(State(state): State<AppState>) -> Result<Json<Vec<BlobRecord>>, AppError> {
    Ok(Json(state.retrieval.list().await?))
}

/// GET `/api/DataFile/{id}`
pub async fn get_blob(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<BlobRecord>, AppError> {
    Ok(Json(state.retrieval.get_by_id(&id).await?))
}

/// GET `/api/DataFile/search?filename=` — case-insensitive filename match.
pub async fn search_blobs(
    State(state): State<AppState>,
    Query(q): Query<SearchQuery>,
) -> Result<Json<Vec<BlobRecord>>, AppError> {
    let pattern = q.filename.unwrap_or_default();
    Ok(Json(state.retrieval.search(&pattern).await?))
}

/// POST `/api/DataFile` — create a record from a JSON body with inline base64 data.
pub async fn create_blob(
    State(state): State<AppState>,
    Json(payload): Json<BlobRecordPayload>,
) -> Result<Response, AppError> {
    let data = decode_data(payload.data.as_deref())?;
    let record = state.ingest.create(data, payload.file_name).await?;
    Ok(created(record))
}

/// POST `/api/DataFile/upload` — store the multipart `file` field.
pub async fn upload_blob(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let mut upload: Option<IngestItem> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("file") {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            upload = Some(IngestItem { data, file_name });
        }
    }

    let item = upload.ok_or_else(|| AppError::bad_request("File is required."))?;
    let record = state.ingest.ingest_one(item.data, item.file_name).await?;
    Ok(created(record))
}

/// POST `/api/DataFile/upload-multiple` — best-effort ingest of every `files` part.
///
/// Empty parts are skipped and per-item storage failures are counted in the
/// response rather than failing the request.
pub async fn upload_blobs(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadManyResponse>, AppError> {
    let mut items = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() == Some("files") {
            let file_name = field.file_name().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            items.push(IngestItem { data, file_name });
        }
    }

    let outcome = state.ingest.ingest_many(items).await;
    Ok(Json(UploadManyResponse {
        message: "Files uploaded successfully.",
        outcome,
    }))
}

/// GET `/api/DataFile/download/{id}` — raw payload as an attachment.
///
/// The payload is fully buffered before it is sent.
pub async fn download_blob(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let content = state.retrieval.stream_content(&id).await?;
    let length = content.data.len();

    let mut response = Response::new(Body::from(content.data));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
    headers.insert(
        header::CONTENT_DISPOSITION,
        content_disposition(content.file_name.as_deref()),
    );
    *response.status_mut() = StatusCode::OK;
    Ok(response)
}

/// PUT `/api/DataFile` — overwrite the record named by the body's `id`.
pub async fn replace_blob(
    State(state): State<AppState>,
    Json(payload): Json<BlobRecordPayload>,
) -> Result<StatusCode, AppError> {
    let id = payload.id.unwrap_or_default();
    let data = decode_data(payload.data.as_deref())?;

    match state
        .mutation
        .replace_all(&id, data, payload.file_name)
        .await?
    {
        MutationOutcome::NotFound => Err(AppError::not_found("File not found")),
        _ => Ok(StatusCode::OK),
    }
}

/// PATCH `/api/DataFile/{id}/rename` — change the display name only.
pub async fn rename_blob(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RenameRequest>,
) -> Result<impl IntoResponse, AppError> {
    match state.mutation.rename(&id, &req.file_name).await? {
        MutationOutcome::NotFound => Err(AppError::not_found("File not found")),
        _ => Ok(Json(json!({ "message": "File renamed successfully." }))),
    }
}

/// DELETE `/api/DataFile/{id}` — idempotent.
pub async fn delete_blob(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.mutation.delete_by_id(&id).await?;
    Ok(StatusCode::OK)
}

fn created(record: BlobRecord) -> Response {
    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/DataFile/{}", record.id)) {
        headers.insert(header::LOCATION, location);
    }
    (StatusCode::CREATED, headers, Json(record)).into_response()
}

/// Decode the optional base64 `data` field. Absence is left to the service.
fn decode_data(data: Option<&str>) -> Result<Option<Vec<u8>>, AppError> {
    data.map(|encoded| {
        general_purpose::STANDARD
            .decode(encoded)
            .map_err(|err| AppError::bad_request(format!("data is not valid base64: {err}")))
    })
    .transpose()
}

fn multipart_error(err: MultipartError) -> AppError {
    AppError::new(err.status(), format!("Multipart error: {}", err.body_text()))
}

/// `attachment` with an ASCII `filename` fallback and the exact UTF-8 name
/// as an RFC 5987 `filename*` parameter.
fn content_disposition(file_name: Option<&str>) -> HeaderValue {
    let Some(name) = file_name.filter(|n| !n.is_empty()) else {
        return HeaderValue::from_static("attachment");
    };
    let fallback: String = name
        .chars()
        .map(|c| {
            if c == '"' || c == '\\' || c.is_control() || !c.is_ascii() {
                '_'
            } else {
                c
            }
        })
        .collect();
    HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(name)
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
