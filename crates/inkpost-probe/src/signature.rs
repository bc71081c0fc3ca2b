//! Image format detection from leading magic bytes

use inkpost_common::ImageKind;

/// Minimum buffer length inspected by [`detect`].
pub const MIN_SIGNATURE_LEN: usize = 12;

const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];
const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
const GIF_MAGIC: [u8; 4] = *b"GIF8";
const RIFF_MAGIC: [u8; 4] = *b"RIFF";
const WEBP_MAGIC: [u8; 4] = *b"WEBP";

/// Detect the image format of a buffer from its leading bytes.
///
/// Returns `None` when the buffer is shorter than [`MIN_SIGNATURE_LEN`] or
/// does not start with a known signature. Pure and total: every input maps
/// to exactly one outcome.
///
/// # Example
///
/// ```
/// use inkpost_common::ImageKind;
/// use inkpost_probe::detect;
///
/// let mut data = b"GIF89a".to_vec();
/// data.resize(16, 0);
/// assert_eq!(detect(&data), Some(ImageKind::Gif));
/// assert_eq!(detect(b"GIF89a"), None);
/// ```
pub fn detect(data: &[u8]) -> Option<ImageKind> {
    if data.len() < MIN_SIGNATURE_LEN {
        return None;
    }

    if data.starts_with(&JPEG_MAGIC) {
        return Some(ImageKind::Jpeg);
    }

    if data.starts_with(&PNG_MAGIC) {
        return Some(ImageKind::Png);
    }

    if data.starts_with(&GIF_MAGIC) {
        return Some(ImageKind::Gif);
    }

    // RIFF <u32 size> WEBP
    if data[0..4] == RIFF_MAGIC && data[8..12] == WEBP_MAGIC {
        return Some(ImageKind::Webp);
    }

    None
}
