//! Trailer checks confirming that a detected image is complete.
//!
//! These are cheap structural checks on the tail of the buffer, not a full
//! decode. They catch truncated downloads and placeholder payloads.

use inkpost_common::ImageKind;

/// Buffers shorter than this are treated as corrupt or placeholder content.
pub const MIN_IMAGE_LEN: usize = 100;

/// How far back from the end a JPEG EOI marker may sit (trailing metadata).
pub const JPEG_EOI_WINDOW: usize = 100;

const JPEG_EOI: [u8; 2] = [0xFF, 0xD9];
const PNG_IEND: [u8; 8] = [0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82];
const GIF_TRAILER: u8 = 0x3B;

/// Check that `data` is a complete, well-formed file of the given kind.
///
/// - JPEG: an `FF D9` end-of-image marker in the last [`JPEG_EOI_WINDOW`] bytes
/// - PNG: the final 8 bytes are the IEND chunk type and CRC
/// - GIF: the final byte is the `;` trailer
/// - WebP: no structural check beyond the minimum length
///
/// # Example
///
/// ```
/// use inkpost_common::ImageKind;
/// use inkpost_probe::validate;
///
/// let mut gif = b"GIF89a".to_vec();
/// gif.resize(120, 0);
/// assert!(!validate(&gif, ImageKind::Gif));
/// gif.push(b';');
/// assert!(validate(&gif, ImageKind::Gif));
/// ```
pub fn validate(data: &[u8], kind: ImageKind) -> bool {
    if data.len() < MIN_IMAGE_LEN {
        return false;
    }

    match kind {
        ImageKind::Jpeg => has_jpeg_eoi(data),
        ImageKind::Png => data.ends_with(&PNG_IEND),
        ImageKind::Gif => data.last() == Some(&GIF_TRAILER),
        // WebP integrity is not verified beyond the signature.
        ImageKind::Webp => true,
    }
}

fn has_jpeg_eoi(data: &[u8]) -> bool {
    if data.ends_with(&JPEG_EOI) {
        return true;
    }
    let start = data.len().saturating_sub(JPEG_EOI_WINDOW);
    data[start..].windows(2).rev().any(|w| w == JPEG_EOI)
}
