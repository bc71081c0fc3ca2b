//! Filename utilities for the upload directory.
//!
//! Stored files are addressed as `{post_id}/{filename}`; these helpers keep
//! untrusted filenames from escaping that layout.

use std::path::Path;

use crate::types::ImageKind;

/// Check whether a filename is safe to join onto a post directory.
///
/// Accepts only non-empty names made of ASCII alphanumerics, `-`, `_` and `.`
/// that do not start with a dot, which rules out `..`, hidden files and any
/// path separator.
///
/// # Examples
///
/// ```
/// use inkpost_common::paths::is_safe_filename;
///
/// assert!(is_safe_filename("3f2a9c.png"));
/// assert!(!is_safe_filename(".."));
/// assert!(!is_safe_filename("a/b.png"));
/// ```
pub fn is_safe_filename(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

/// Image kind implied by a filename's extension, if any.
///
/// # Examples
///
/// ```
/// use inkpost_common::paths::kind_from_filename;
/// use inkpost_common::ImageKind;
///
/// assert_eq!(kind_from_filename("cover.JPG"), Some(ImageKind::Jpeg));
/// assert_eq!(kind_from_filename("notes.txt"), None);
/// ```
pub fn kind_from_filename(name: &str) -> Option<ImageKind> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .and_then(ImageKind::from_extension)
}
