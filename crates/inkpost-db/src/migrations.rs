//! Embedded SQL migrations and runner.
//!
//! Migrations are stored as `&str` constants and executed in order. A
//! `schema_migrations` table tracks which versions have been applied.

use inkpost_common::{Error, Result};
use rusqlite::Connection;

/// V1: image metadata table.
const V1_IMAGES: &str = r#"
CREATE TABLE images (
    id            TEXT PRIMARY KEY,
    post_id       INTEGER NOT NULL CHECK (post_id > 0),
    original_name TEXT NOT NULL,
    storage_path  TEXT NOT NULL UNIQUE,
    size_bytes    INTEGER NOT NULL,
    detected_type TEXT NOT NULL,
    content_hash  TEXT NOT NULL,
    created_at    TEXT NOT NULL
);

CREATE INDEX idx_images_post_id ON images(post_id);
"#;

/// V2: lookups by content hash (duplicate audits).
const V2_CONTENT_HASH_INDEX: &str = r#"
CREATE INDEX idx_images_content_hash ON images(content_hash);
"#;

const MIGRATIONS: &[(i64, &str)] = &[(1, V1_IMAGES), (2, V2_CONTENT_HASH_INDEX)];

/// Run every migration that has not been applied yet.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    for &(version, sql) in MIGRATIONS {
        let already: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM schema_migrations WHERE version = ?1",
                [version],
                |row| row.get(0),
            )
            .map_err(|e| Error::database(e.to_string()))?;

        if already {
            continue;
        }

        let tx = conn
            .unchecked_transaction()
            .map_err(|e| Error::database(e.to_string()))?;

        tx.execute_batch(sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;

        tx.execute(
            "INSERT INTO schema_migrations (version) VALUES (?1)",
            [version],
        )
        .map_err(|e| Error::database(e.to_string()))?;

        tx.commit().map_err(|e| Error::database(e.to_string()))?;
    }

    Ok(())
}

/// Latest schema version known to this build.
pub fn latest_version() -> i64 {
    MIGRATIONS.last().map(|&(v, _)| v).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // second call is a no-op
        run_migrations(&conn).unwrap();

        let applied: i64 = conn
            .query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(applied, latest_version());
    }

    #[test]
    fn test_images_table_created() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='images'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_post_id_must_be_positive() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO images (id, post_id, original_name, storage_path, size_bytes,
                                 detected_type, content_hash, created_at)
             VALUES ('x', 0, 'a.png', '/images/0/a.png', 1, 'png', 'h', '2024-01-01T00:00:00Z')",
            [],
        );
        assert!(result.is_err());
    }
}
