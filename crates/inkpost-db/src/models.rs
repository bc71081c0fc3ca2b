//! Rust models matching the database schema.

use chrono::{DateTime, Utc};
use inkpost_common::{ImageId, ImageKind, PostId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, err.into())
}

fn parse_id<T: From<Uuid>>(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<T> {
    let s: String = row.get(idx)?;
    let uuid = Uuid::parse_str(&s).map_err(|e| conversion_error(idx, e))?;
    Ok(T::from(uuid))
}

fn parse_dt(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

/// One stored image. Created once per successful ingest and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: ImageId,
    pub post_id: PostId,
    /// Best-effort name from the source URL or upload.
    pub original_name: String,
    /// Public path, `/images/{post_id}/{filename}`.
    pub storage_path: String,
    pub size_bytes: i64,
    /// Kind determined from the content, never from headers or extensions.
    pub detected_type: ImageKind,
    /// First 16 hex chars of the SHA-256 of the stored bytes.
    pub content_hash: String,
    pub created_at: DateTime<Utc>,
}

impl ImageRecord {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        let raw_post: i64 = row.get(1)?;
        let post_id = PostId::new(raw_post).map_err(|e| conversion_error(1, e))?;
        let kind: String = row.get(5)?;
        let detected_type = kind
            .parse::<ImageKind>()
            .map_err(|e| conversion_error(5, e))?;

        Ok(Self {
            id: parse_id(row, 0)?,
            post_id,
            original_name: row.get(2)?,
            storage_path: row.get(3)?,
            size_bytes: row.get(4)?,
            detected_type,
            content_hash: row.get(6)?,
            created_at: parse_dt(row, 7)?,
        })
    }

    /// Filename component of the storage path.
    pub fn filename(&self) -> &str {
        self.storage_path
            .rsplit('/')
            .next()
            .unwrap_or(&self.storage_path)
    }
}

/// Fields supplied by the caller when inserting an image.
///
/// `id` and `created_at` are assigned by [`crate::queries::images::create_image`].
#[derive(Debug, Clone, Copy)]
pub struct NewImage<'a> {
    pub post_id: PostId,
    pub original_name: &'a str,
    pub storage_path: &'a str,
    pub size_bytes: i64,
    pub detected_type: ImageKind,
    pub content_hash: &'a str,
}
