//! Represents a stored file: raw payload plus descriptive metadata.

use base64::{Engine as _, engine::general_purpose};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use sqlx::FromRow;

/// A single stored blob and its metadata.
///
/// `data` is held as raw bytes and rendered as base64 in JSON. The derived
/// fields (`extension`, `file_size`, `file_hash`) are computed by the ingest
/// path and never set independently by callers.
#[derive(Serialize, Clone, FromRow, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    /// Opaque identifier assigned by the repository on insert.
    pub id: String,

    /// Raw file payload.
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,

    /// Display name, mutable through rename.
    pub file_name: Option<String>,

    /// Extension of `file_name` including the leading dot (e.g. `.pdf`).
    pub extension: Option<String>,

    /// Byte length of `data`.
    pub file_size: i64,

    /// When the record was first stored. Never changed afterwards.
    pub upload_date: DateTime<Utc>,

    /// Hex-encoded SHA-256 of `data`. Not unique across records.
    pub file_hash: Option<String>,
}

/// A fully derived record that has not yet been assigned an id.
#[derive(Clone, Debug)]
pub struct NewBlobRecord {
    pub data: Vec<u8>,
    pub file_name: Option<String>,
    pub extension: Option<String>,
    pub file_size: i64,
    pub upload_date: DateTime<Utc>,
    pub file_hash: Option<String>,
}

impl NewBlobRecord {
    /// Attach the repository-assigned id.
    pub fn with_id(self, id: String) -> BlobRecord {
        BlobRecord {
            id,
            data: self.data,
            file_name: self.file_name,
            extension: self.extension,
            file_size: self.file_size,
            upload_date: self.upload_date,
            file_hash: self.file_hash,
        }
    }
}

/// JSON body accepted by metadata-only create and full replace.
///
/// Only `id`, `data` and `fileName` are read. Derived fields a client sends
/// back (`extension`, `fileSize`, `fileHash`, `uploadDate`) are ignored.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecordPayload {
    pub id: Option<String>,

    /// Base64-encoded payload. Required.
    pub data: Option<String>,

    pub file_name: Option<String>,
}

/// Body for `PATCH /api/DataFile/{id}/rename`.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RenameRequest {
    pub file_name: String,
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&general_purpose::STANDARD.encode(data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn serializes_with_camel_case_and_base64_data() {
        let record = NewBlobRecord {
            data: b"hello".to_vec(),
            file_name: Some("greeting.txt".into()),
            extension: Some(".txt".into()),
            file_size: 5,
            upload_date: DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
            file_hash: None,
        }
        .with_id("abc".into());

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["id"], json!("abc"));
        assert_eq!(value["data"], json!("aGVsbG8="));
        assert_eq!(value["fileName"], json!("greeting.txt"));
        assert_eq!(value["fileSize"], json!(5));
        assert_eq!(value["fileHash"], json!(null));
        assert!(value.get("uploadDate").is_some());
    }

    #[test]
    fn payload_accepts_partial_json() {
        let payload: BlobRecordPayload =
            serde_json::from_value(json!({
                "data": "aGk=",
                "fileName": "a.bin",
                "fileHash": "ignored",
                "fileSize": 99
            }))
            .unwrap();
        assert_eq!(payload.data.as_deref(), Some("aGk="));
        assert_eq!(payload.file_name.as_deref(), Some("a.bin"));
        assert!(payload.id.is_none());
    }
}
