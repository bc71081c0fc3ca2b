//! Filesystem-level image storage.
//!
//! Images live under `{upload_root}/{post_id}/{filename}`, where the filename
//! is an opaque `{uuid}.{ext}` chosen from the detected kind. The public path
//! of a stored file is `/images/{post_id}/{filename}`.

use std::io::Write;
use std::path::{Path, PathBuf};

use inkpost_common::paths::is_safe_filename;
use inkpost_common::{Error, ImageKind, PostId, Result};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Public URL prefix under which stored images are served.
pub const PUBLIC_PREFIX: &str = "/images";

/// Filesystem manager for per-post image directories.
#[derive(Debug, Clone)]
pub struct ImageStorage {
    base_dir: PathBuf,
}

impl ImageStorage {
    /// Create a new `ImageStorage` rooted at `base_dir`.
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Directory holding all images of a post.
    pub fn post_dir(&self, post_id: PostId) -> PathBuf {
        self.base_dir.join(post_id.to_string())
    }

    /// Create the post directory and any missing parents. Idempotent.
    pub fn ensure_dir(&self, post_id: PostId) -> Result<PathBuf> {
        let dir = self.post_dir(post_id);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Write `data` to `{post_id}/{filename}`.
    ///
    /// Bytes go to a temporary file in the post directory first and are
    /// renamed into place, so readers never observe a half-written image.
    pub fn write_file(&self, post_id: PostId, filename: &str, data: &[u8]) -> Result<PathBuf> {
        let path = self.file_path(post_id, filename)?;
        let dir = self.ensure_dir(post_id)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(data)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| Error::from(e.error))?;

        Ok(path)
    }

    /// Read a stored file back. Missing files are [`Error::NotFound`].
    pub fn read_file(&self, post_id: PostId, filename: &str) -> Result<Vec<u8>> {
        let path = self.file_path(post_id, filename)?;
        match std::fs::read(&path) {
            Ok(data) => Ok(data),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(Error::not_found("image", format!("{post_id}/{filename}")))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Filesystem location of `{post_id}/{filename}`.
    ///
    /// Rejects filenames that could escape the post directory.
    pub fn file_path(&self, post_id: PostId, filename: &str) -> Result<PathBuf> {
        if !is_safe_filename(filename) {
            return Err(Error::invalid_input(format!("invalid filename: {filename}")));
        }
        Ok(self.post_dir(post_id).join(filename))
    }
}

/// Public path of a stored image: `/images/{post_id}/{filename}`.
pub fn public_path(post_id: PostId, filename: &str) -> String {
    format!("{PUBLIC_PREFIX}/{post_id}/{filename}")
}

/// Opaque filename for a new image of the given kind.
pub fn generate_filename(kind: ImageKind) -> String {
    format!("{}.{}", Uuid::new_v4().simple(), kind.extension())
}

/// Compute the content hash for image data.
///
/// Returns the first 16 hex characters of the SHA-256 digest.
pub fn compute_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let digest = hasher.finalize();
    hex::encode(&digest[..8]) // 8 bytes = 16 hex chars
}
