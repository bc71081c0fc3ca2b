use inkpost_db::pool::PoolOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub fetch: FetchConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Built admin/reader frontend, served as an SPA fallback
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            static_dir: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Root of the per-post image directories
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// SQLite file holding image metadata
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Open SQLite connections; should cover `fetch.batch_concurrency`
    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: u32,

    #[serde(default = "default_db_busy_timeout_ms")]
    pub db_busy_timeout_ms: u64,
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from("uploads/images")
}
fn default_database_path() -> PathBuf {
    PathBuf::from("inkpost.db")
}
fn default_db_pool_size() -> u32 {
    4
}
fn default_db_busy_timeout_ms() -> u64 {
    5000
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: default_upload_dir(),
            database_path: default_database_path(),
            db_pool_size: default_db_pool_size(),
            db_busy_timeout_ms: default_db_busy_timeout_ms(),
        }
    }
}

impl StorageConfig {
    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            max_size: self.db_pool_size,
            busy_timeout: Duration::from_millis(self.db_busy_timeout_ms),
        }
    }
}

/// Outbound fetch policy for URL-based ingestion.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FetchConfig {
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Total budget for one request, including the body download
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Hard cap on a single image, applied to uploads and downloads alike
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Concurrent outbound fetches within one batch
    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,
}

fn default_connect_timeout() -> u64 {
    10
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_redirects() -> usize {
    10
}
fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; InkpostImageFetcher/1.0)".to_string()
}
fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}
fn default_max_batch_size() -> usize {
    20
}
fn default_batch_concurrency() -> usize {
    5
}

impl FetchConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
            max_image_bytes: default_max_image_bytes(),
            max_batch_size: default_max_batch_size(),
            batch_concurrency: default_batch_concurrency(),
        }
    }
}
