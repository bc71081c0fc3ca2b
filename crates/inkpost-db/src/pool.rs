//! SQLite connection pools.
//!
//! Every pool handed out here has the schema migrated before it is returned,
//! so callers never see an empty database.

use std::path::Path;
use std::time::Duration;

use inkpost_common::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

pub type DbPool = Pool<SqliteConnectionManager>;
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Sizing and locking knobs for a file-backed pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolOptions {
    /// Upper bound on open connections. Batch fetches insert from up to
    /// `batch_concurrency` blocking tasks at once.
    pub max_size: u32,
    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 4,
            busy_timeout: Duration::from_secs(5),
        }
    }
}

/// Open (creating if needed) the database at `path`.
///
/// Connections run in WAL mode so readers listing a post's images do not
/// block the ingest writers.
pub fn open_pool(path: &Path, options: &PoolOptions) -> Result<DbPool> {
    if options.max_size == 0 {
        return Err(Error::invalid_input("pool size must be at least 1"));
    }

    let busy_timeout = options.busy_timeout;
    let manager = SqliteConnectionManager::file(path).with_init(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        Ok(())
    });

    migrated(manager, options.max_size)
        .map_err(|e| Error::database(format!("{}: {e}", path.display())))
}

/// Private in-memory database, for tests and one-off tooling.
///
/// Each call gets its own shared-cache name: connections of one pool see the
/// same data, separate pools never do.
pub fn init_memory_pool() -> Result<DbPool> {
    use std::sync::atomic::{AtomicU64, Ordering};
    static NEXT: AtomicU64 = AtomicU64::new(0);

    let name = NEXT.fetch_add(1, Ordering::Relaxed);
    let manager =
        SqliteConnectionManager::file(format!("file:inkpost_memdb_{name}?mode=memory&cache=shared"));
    migrated(manager, PoolOptions::default().max_size)
}

fn migrated(manager: SqliteConnectionManager, max_size: u32) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(max_size)
        .build(manager)
        .map_err(|e| Error::database(format!("pool setup failed: {e}")))?;
    migrations::run_migrations(&*get_conn(&pool)?)?;
    Ok(pool)
}

pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("no database connection available: {e}")))
}
