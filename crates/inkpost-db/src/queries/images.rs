//! Image metadata operations.

use chrono::{SecondsFormat, Utc};
use inkpost_common::{Error, ImageId, PostId, Result};
use rusqlite::{Connection, OptionalExtension};

use crate::models::{ImageRecord, NewImage};

const COLS: &str =
    "id, post_id, original_name, storage_path, size_bytes, detected_type, content_hash, created_at";

/// Insert a new image record, assigning its id and creation timestamp.
pub fn create_image(conn: &Connection, new: &NewImage<'_>) -> Result<ImageRecord> {
    let id = ImageId::new();
    // Stored at microsecond precision so the returned record round-trips.
    let created_at_str = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| Error::Internal(e.to_string()))?
        .with_timezone(&Utc);

    conn.execute(
        "INSERT INTO images (id, post_id, original_name, storage_path, size_bytes,
                             detected_type, content_hash, created_at)
         VALUES (?1,?2,?3,?4,?5,?6,?7,?8)",
        rusqlite::params![
            id.to_string(),
            new.post_id.get(),
            new.original_name,
            new.storage_path,
            new.size_bytes,
            new.detected_type.to_string(),
            new.content_hash,
            created_at_str,
        ],
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(ImageRecord {
        id,
        post_id: new.post_id,
        original_name: new.original_name.to_string(),
        storage_path: new.storage_path.to_string(),
        size_bytes: new.size_bytes,
        detected_type: new.detected_type,
        content_hash: new.content_hash.to_string(),
        created_at,
    })
}

/// Get an image by ID.
pub fn get_image(conn: &Connection, id: ImageId) -> Result<Option<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM images WHERE id = ?1");
    conn.query_row(&q, [id.to_string()], ImageRecord::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// Get an image by its public storage path.
pub fn get_image_by_storage_path(conn: &Connection, path: &str) -> Result<Option<ImageRecord>> {
    let q = format!("SELECT {COLS} FROM images WHERE storage_path = ?1");
    conn.query_row(&q, [path], ImageRecord::from_row)
        .optional()
        .map_err(|e| Error::database(e.to_string()))
}

/// List images for a post, newest first.
pub fn list_images_by_post(conn: &Connection, post_id: PostId) -> Result<Vec<ImageRecord>> {
    let q = format!(
        "SELECT {COLS} FROM images WHERE post_id = ?1 ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&q).map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([post_id.get()], ImageRecord::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Count images stored for a post.
pub fn count_images_by_post(conn: &Connection, post_id: PostId) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM images WHERE post_id = ?1",
        [post_id.get()],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}
