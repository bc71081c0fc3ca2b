//! Shared test harness for integration tests.
//!
//! Provides byte fixtures for each supported format and [`TestHarness`],
//! which wires an [`ImageService`] to a temporary upload root and an
//! in-memory database.

#![allow(dead_code)]

use inkpost::config::FetchConfig;
use inkpost::images::{ImageService, ImageStorage};
use inkpost::server::{create_router, AppContext};
use inkpost_common::PostId;
use tempfile::TempDir;

pub const PNG_SIGNATURE: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const PNG_IEND: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];

/// JPEG of `len` bytes: SOI + APP0 marker, zero filler, EOI.
pub fn jpeg_bytes(len: usize) -> Vec<u8> {
    assert!(len >= 100);
    let mut data = vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];
    data.resize(len - 2, 0x00);
    data.extend_from_slice(&[0xFF, 0xD9]);
    data
}

pub fn png_bytes() -> Vec<u8> {
    let mut data = PNG_SIGNATURE.to_vec();
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D', b'R']);
    data.resize(200, 0x00);
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(&PNG_IEND);
    data
}

pub fn gif_bytes() -> Vec<u8> {
    let mut data = b"GIF89a".to_vec();
    data.resize(150, 0x00);
    data.push(0x3B);
    data
}

pub fn webp_bytes() -> Vec<u8> {
    let mut data = b"RIFF".to_vec();
    data.extend_from_slice(&[0x00, 0x01, 0x00, 0x00]);
    data.extend_from_slice(b"WEBPVP8 ");
    data.resize(160, 0x11);
    data
}

pub fn post(n: i64) -> PostId {
    PostId::new(n).unwrap()
}

/// Test harness wrapping an [`ImageService`] backed by a temp directory and
/// an in-memory database.
pub struct TestHarness {
    pub dir: TempDir,
    pub service: ImageService,
}

impl TestHarness {
    /// Create a new harness with default fetch policy.
    pub fn new() -> Self {
        Self::with_fetch(FetchConfig::default())
    }

    /// Create a new harness with a custom fetch policy.
    pub fn with_fetch(fetch: FetchConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let storage = ImageStorage::new(dir.path().join("uploads"));
        let pool = inkpost_db::pool::init_memory_pool().unwrap();
        let service = ImageService::new(storage, pool, &fetch).unwrap();
        Self { dir, service }
    }

    pub fn router(&self) -> axum::Router {
        create_router(AppContext::new(self.service.clone()), None)
    }

    /// Number of files stored for `post_id` on disk.
    pub fn files_on_disk(&self, post_id: PostId) -> usize {
        let dir = self.service.storage().post_dir(post_id);
        match std::fs::read_dir(dir) {
            Ok(entries) => entries.count(),
            Err(_) => 0,
        }
    }
}
