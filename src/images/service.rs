//! Image service coordinating storage, fetching and database operations.
//!
//! This is the boundary the HTTP layer and the CLI talk to. It owns the
//! request-level policy (batch size limits, filename safety) and delegates the
//! per-image work to the ingest pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use inkpost_common::paths::kind_from_filename;
use inkpost_common::{Error, ImageKind, PostId, Result};
use inkpost_db::models::ImageRecord;
use inkpost_db::pool::DbPool;
use inkpost_db::queries::images;

use super::batch::{BatchFetcher, BatchResult};
use super::fetcher::ImageFetcher;
use super::ingest::Ingestor;
use super::storage::ImageStorage;
use crate::config::{Config, FetchConfig};

/// High-level image service.
#[derive(Clone)]
pub struct ImageService {
    ingestor: Ingestor,
    fetcher: Arc<ImageFetcher>,
    batch: BatchFetcher,
    max_batch_size: usize,
}

impl ImageService {
    /// Create a new `ImageService`.
    ///
    /// # Arguments
    ///
    /// * `storage` - The filesystem image storage backend
    /// * `pool` - Database connection pool
    /// * `fetch` - Outbound fetch policy and size limits
    pub fn new(storage: ImageStorage, pool: DbPool, fetch: &FetchConfig) -> Result<Self> {
        let ingestor = Ingestor::new(storage, pool, fetch.max_image_bytes);
        let fetcher = Arc::new(ImageFetcher::new(fetch, ingestor.clone())?);
        let batch = BatchFetcher::new(Arc::clone(&fetcher), fetch.batch_concurrency);

        Ok(Self {
            ingestor,
            fetcher,
            batch,
            max_batch_size: fetch.max_batch_size,
        })
    }

    /// Build the service from a loaded config, opening the database file.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        use anyhow::Context;

        if let Some(parent) = config.storage.database_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let db_path = &config.storage.database_path;
        let pool = inkpost_db::pool::open_pool(db_path, &config.storage.pool_options())
            .with_context(|| format!("Failed to open database: {}", db_path.display()))?;
        let storage = ImageStorage::new(config.storage.upload_dir.clone());

        Ok(Self::new(storage, pool, &config.fetch)?)
    }

    pub fn storage(&self) -> &ImageStorage {
        self.ingestor.storage()
    }

    pub fn pool(&self) -> &DbPool {
        self.ingestor.pool()
    }

    pub fn max_image_bytes(&self) -> usize {
        self.ingestor.max_bytes()
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Store a directly uploaded file.
    ///
    /// Uploads go through the same detection and validation as fetched
    /// images; `file_name` is kept only as the record's original name.
    pub async fn store_upload(
        &self,
        post_id: PostId,
        data: Vec<u8>,
        file_name: Option<&str>,
    ) -> Result<ImageRecord> {
        self.ingestor.ingest(post_id, data, file_name).await
    }

    /// Fetch a single remote image.
    pub async fn fetch_one(&self, url: &str, post_id: PostId) -> Result<ImageRecord> {
        self.fetcher.fetch_and_store(url, post_id).await
    }

    /// Fetch a batch of remote images after checking the batch size.
    pub async fn fetch_many(&self, urls: &[String], post_id: PostId) -> Result<BatchResult> {
        if urls.is_empty() {
            return Err(Error::invalid_input("at least one URL is required"));
        }
        if urls.len() > self.max_batch_size {
            return Err(Error::invalid_input(format!(
                "too many URLs: {} (max {})",
                urls.len(),
                self.max_batch_size
            )));
        }

        Ok(self.batch.fetch_all(urls, post_id).await)
    }

    /// Stored images of a post, newest first.
    pub async fn list_for_post(&self, post_id: PostId) -> Result<Vec<ImageRecord>> {
        let pool = self.pool().clone();
        tokio::task::spawn_blocking(move || {
            let conn = inkpost_db::pool::get_conn(&pool)?;
            images::list_images_by_post(&conn, post_id)
        })
        .await
        .map_err(|e| Error::Internal(format!("database task failed: {e}")))?
    }

    /// Location of a stored file and the content type implied by its name.
    ///
    /// Pure path resolution: whether the file exists is left to whoever opens
    /// it. Unknown extensions are served as JPEG.
    pub fn image_path(&self, post_id: PostId, filename: &str) -> Result<(PathBuf, &'static str)> {
        let path = self.storage().file_path(post_id, filename)?;
        let mime = kind_from_filename(filename)
            .unwrap_or(ImageKind::Jpeg)
            .mime_type();
        Ok((path, mime))
    }

    /// Read a stored image by post and filename.
    pub async fn read_image(&self, post_id: PostId, filename: &str) -> Result<Vec<u8>> {
        let storage = self.storage().clone();
        let filename = filename.to_string();
        tokio::task::spawn_blocking(move || storage.read_file(post_id, &filename))
            .await
            .map_err(|e| Error::Internal(format!("storage task failed: {e}")))?
    }
}
