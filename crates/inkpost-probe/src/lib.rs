//! # inkpost-probe
//!
//! Pure Rust image format detection and integrity checking.
//!
//! The ingestion pipeline never trusts file extensions or server-declared
//! content types. This crate decides what a buffer actually is by looking at
//! its bytes:
//!
//! - [`detect`]: magic-number detection for JPEG, PNG, GIF and WebP
//! - [`validate`]: trailer checks (JPEG EOI, PNG IEND, GIF `;`)
//! - [`inspect`]: both steps, with a typed error
//!
//! ## Example
//!
//! ```
//! use inkpost_common::ImageKind;
//! use inkpost_probe::{inspect, ProbeError};
//!
//! let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE0];
//! jpeg.resize(256, 0);
//! assert!(matches!(inspect(&jpeg), Err(ProbeError::Corrupt { .. })));
//!
//! jpeg.extend_from_slice(&[0xFF, 0xD9]);
//! assert_eq!(inspect(&jpeg), Ok(ImageKind::Jpeg));
//! ```

pub mod error;
pub mod integrity;
pub mod signature;

pub use error::ProbeError;
pub use integrity::{validate, MIN_IMAGE_LEN};
pub use signature::{detect, MIN_SIGNATURE_LEN};

use inkpost_common::ImageKind;

/// Detect the kind of `data` and confirm it is complete.
///
/// # Returns
///
/// The detected [`ImageKind`], or [`ProbeError::UnknownSignature`] when no
/// signature matches and [`ProbeError::Corrupt`] when the trailer check fails.
pub fn inspect(data: &[u8]) -> Result<ImageKind, ProbeError> {
    let kind = detect(data).ok_or(ProbeError::UnknownSignature { len: data.len() })?;

    if !validate(data, kind) {
        return Err(ProbeError::Corrupt {
            kind,
            len: data.len(),
        });
    }

    Ok(kind)
}
