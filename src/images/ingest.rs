//! Detect, validate, write and record one image.
//!
//! Both ingestion paths (direct upload and URL fetch) end here, so a stored
//! image has always passed the same size cap, signature detection and
//! integrity check, and its extension always comes from the detected kind.

use inkpost_common::{Error, ImageKind, PostId, Result};
use inkpost_db::models::{ImageRecord, NewImage};
use inkpost_db::pool::DbPool;
use inkpost_db::queries::images;

use super::storage::{compute_hash, generate_filename, public_path, ImageStorage};

#[derive(Clone)]
pub struct Ingestor {
    storage: ImageStorage,
    pool: DbPool,
    max_bytes: usize,
}

impl Ingestor {
    pub fn new(storage: ImageStorage, pool: DbPool, max_bytes: usize) -> Self {
        Self {
            storage,
            pool,
            max_bytes,
        }
    }

    pub fn storage(&self) -> &ImageStorage {
        &self.storage
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Run the full pipeline over `data` and persist the result.
    ///
    /// `name_hint` is only recorded as `original_name`; it never influences
    /// the stored filename.
    pub async fn ingest(
        &self,
        post_id: PostId,
        data: Vec<u8>,
        name_hint: Option<&str>,
    ) -> Result<ImageRecord> {
        if data.is_empty() {
            return Err(Error::invalid_input("image is empty"));
        }
        if data.len() > self.max_bytes {
            return Err(too_large(data.len(), self.max_bytes));
        }

        let kind = inkpost_probe::inspect(&data)?;
        let filename = generate_filename(kind);
        let original_name = original_name_or_default(name_hint, kind);

        let storage = self.storage.clone();
        let pool = self.pool.clone();
        let record = tokio::task::spawn_blocking(move || {
            storage.write_file(post_id, &filename, &data)?;

            let storage_path = public_path(post_id, &filename);
            let content_hash = compute_hash(&data);
            let conn = inkpost_db::pool::get_conn(&pool)?;
            images::create_image(
                &conn,
                &NewImage {
                    post_id,
                    original_name: &original_name,
                    storage_path: &storage_path,
                    size_bytes: data.len() as i64,
                    detected_type: kind,
                    content_hash: &content_hash,
                },
            )
        })
        .await
        .map_err(|e| Error::Internal(format!("storage task failed: {e}")))??;

        tracing::info!(
            post_id = %record.post_id,
            storage_path = %record.storage_path,
            kind = %record.detected_type,
            size = record.size_bytes,
            "Stored image"
        );

        Ok(record)
    }
}

pub(crate) fn too_large(size: usize, max: usize) -> Error {
    Error::invalid_input(format!("image too large: {size} bytes (max {max})"))
}

fn original_name_or_default(hint: Option<&str>, kind: ImageKind) -> String {
    match hint.map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("image.{}", kind.extension()),
    }
}
