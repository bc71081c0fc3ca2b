//! Image ingestion module.
//!
//! Stores blog images per post, either uploaded directly or fetched from a
//! remote URL. Every image is checked by `inkpost_probe` before it touches
//! disk and is recorded through `inkpost_db` once written.

mod batch;
mod fetcher;
mod ingest;
mod service;
mod storage;

pub use batch::{BatchFetcher, BatchResult};
pub use fetcher::{filename_from_url, parse_image_url, ImageFetcher};
pub use ingest::Ingestor;
pub use service::ImageService;
pub use storage::{compute_hash, generate_filename, public_path, ImageStorage, PUBLIC_PREFIX};
