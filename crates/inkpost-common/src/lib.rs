//! Inkpost-Common: Shared types, constants, and utilities.
//!
//! This crate provides common functionality used across inkpost:
//!
//! - **Typed IDs**: `PostId` for the owning blog post, `ImageId` for stored images
//! - **Core Types**: [`ImageKind`], the set of image formats the ingestion core accepts
//! - **Path Utilities**: Filename safety checks and extension helpers
//! - **Error Handling**: A unified error type with HTTP status mapping
//!
//! # Examples
//!
//! ```
//! use inkpost_common::{Error, ImageKind, PostId, Result};
//! use inkpost_common::paths::is_safe_filename;
//!
//! let post_id: PostId = "42".parse().unwrap();
//! assert_eq!(post_id.get(), 42);
//!
//! assert_eq!(ImageKind::Png.extension(), "png");
//! assert!(!is_safe_filename("../etc/passwd"));
//!
//! fn example() -> Result<()> {
//!     Err(Error::invalid_input("bad url"))
//! }
//! assert_eq!(example().unwrap_err().http_status(), 400);
//! ```

pub mod error;
pub mod ids;
pub mod paths;
pub mod types;

pub use error::{Error, Result};
pub use ids::*;
pub use types::*;
