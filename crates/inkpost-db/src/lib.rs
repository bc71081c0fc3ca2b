//! Inkpost-DB: image metadata persistence
//!
//! This crate stores one [`models::ImageRecord`] per successfully ingested
//! image, using SQLite with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Embedded schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```
//! use inkpost_common::{ImageKind, PostId};
//! use inkpost_db::models::NewImage;
//! use inkpost_db::pool::{get_conn, init_memory_pool};
//! use inkpost_db::queries::images;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let post_id = PostId::new(1).unwrap();
//! let record = images::create_image(
//!     &conn,
//!     &NewImage {
//!         post_id,
//!         original_name: "cover.png",
//!         storage_path: "/images/1/0f3c.png",
//!         size_bytes: 2048,
//!         detected_type: ImageKind::Png,
//!         content_hash: "00112233aabbccdd",
//!     },
//! )
//! .unwrap();
//! assert_eq!(images::list_images_by_post(&conn, post_id).unwrap(), vec![record]);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
