//! Batch fetcher: run the single-image fetcher over a list of URLs.
//!
//! Items are fully isolated. A failed URL maps to itself and is listed in
//! `failed`, which lets the editor keep the original link and retry later.

use std::collections::HashSet;
use std::sync::Arc;

use inkpost_common::PostId;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Serialize, Serializer};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use super::fetcher::ImageFetcher;

/// Outcome of a batch fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    /// `(source_url, result_url)` in input order.
    pub mappings: Vec<(String, String)>,
    /// Source URLs that could not be stored, in input order.
    pub failed: Vec<String>,
    /// Length of the submitted list, repeated URLs included.
    pub total: usize,
}

impl BatchResult {
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of URLs that were stored.
    pub fn uploaded(&self) -> usize {
        self.mappings.iter().filter(|(src, dst)| src != dst).count()
    }

    /// Result URL for `source`, if it was part of the batch.
    pub fn get(&self, source: &str) -> Option<&str> {
        self.mappings
            .iter()
            .find(|(src, _)| src == source)
            .map(|(_, dst)| dst.as_str())
    }

    pub fn is_failed(&self, source: &str) -> bool {
        self.failed.iter().any(|f| f == source)
    }
}

struct OrderedMappings<'a>(&'a [(String, String)]);

impl Serialize for OrderedMappings<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (src, dst) in self.0 {
            map.serialize_entry(src, dst)?;
        }
        map.end()
    }
}

impl Serialize for BatchResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("BatchResult", 4)?;
        s.serialize_field("mappings", &OrderedMappings(&self.mappings))?;
        s.serialize_field("failed", &self.failed)?;
        s.serialize_field("total", &self.total())?;
        s.serialize_field("uploaded", &self.uploaded())?;
        s.end()
    }
}

/// Runs fetches for a batch with bounded concurrency.
#[derive(Clone)]
pub struct BatchFetcher {
    fetcher: Arc<ImageFetcher>,
    concurrency: usize,
}

impl BatchFetcher {
    pub fn new(fetcher: Arc<ImageFetcher>, concurrency: usize) -> Self {
        Self {
            fetcher,
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch every URL in `urls` for `post_id`.
    ///
    /// The caller enforces the batch size limit. Duplicate URLs are fetched
    /// once. Dropping the returned future aborts fetches still in flight.
    pub async fn fetch_all(&self, urls: &[String], post_id: PostId) -> BatchResult {
        let mut seen = HashSet::new();
        let unique: Vec<String> = urls
            .iter()
            .filter(|u| seen.insert(u.as_str()))
            .cloned()
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();

        for (idx, url) in unique.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let url = url.clone();
            tasks.spawn(async move {
                let outcome = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetcher
                        .fetch_and_store(&url, post_id)
                        .await
                        .map(|record| record.storage_path),
                    Err(e) => Err(inkpost_common::Error::Internal(e.to_string())),
                };
                (idx, outcome)
            });
        }

        let mut outcomes: Vec<Option<Result<String, String>>> = vec![None; unique.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, outcome)) => {
                    if let Err(ref e) = outcome {
                        tracing::warn!(
                            url = %unique[idx],
                            post_id = %post_id,
                            error = %e,
                            "Batch item failed"
                        );
                    }
                    outcomes[idx] = Some(outcome.map_err(|e| e.to_string()));
                }
                Err(e) => tracing::error!("Batch fetch task panicked: {}", e),
            }
        }

        let mut result = BatchResult {
            total: urls.len(),
            ..BatchResult::default()
        };
        for (url, outcome) in unique.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok(path)) => result.mappings.push((url, path)),
                // Panicked tasks leave no outcome and count as failures.
                Some(Err(_)) | None => {
                    result.mappings.push((url.clone(), url.clone()));
                    result.failed.push(url);
                }
            }
        }

        tracing::info!(
            post_id = %post_id,
            total = result.total(),
            uploaded = result.uploaded(),
            failed = result.failed.len(),
            "Batch fetch complete"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BatchResult {
        BatchResult {
            mappings: vec![
                ("https://b.example/2.png".into(), "/images/1/x.png".into()),
                ("https://a.example/1.png".into(), "https://a.example/1.png".into()),
                ("https://c.example/3.gif".into(), "/images/1/y.gif".into()),
            ],
            failed: vec!["https://a.example/1.png".into()],
            total: 3,
        }
    }

    #[test]
    fn test_counts() {
        let result = sample();
        assert_eq!(result.total(), 3);
        assert_eq!(result.uploaded(), 2);
        assert!(result.is_failed("https://a.example/1.png"));
        assert_eq!(result.get("https://c.example/3.gif"), Some("/images/1/y.gif"));
        assert_eq!(result.get("https://missing.example"), None);
    }

    #[test]
    fn test_serializes_mappings_in_input_order() {
        let json = serde_json::to_string(&sample()).unwrap();
        let b = json.find("b.example").unwrap();
        let a = json.find("a.example").unwrap();
        let c = json.find("c.example").unwrap();
        assert!(b < a && a < c);

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total"], 3);
        assert_eq!(value["uploaded"], 2);
        assert_eq!(value["failed"][0], "https://a.example/1.png");
        assert_eq!(
            value["mappings"]["https://a.example/1.png"],
            "https://a.example/1.png"
        );
    }

    #[test]
    fn test_total_counts_repeated_sources() {
        let result = BatchResult {
            mappings: vec![("https://a.example/1.png".into(), "/images/1/x.png".into())],
            failed: Vec::new(),
            total: 2,
        };
        assert_eq!(result.total(), 2);
        assert_eq!(result.uploaded(), 1);

        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["total"], 2);
        assert_eq!(value["mappings"].as_object().unwrap().len(), 1);
    }

    #[test]
    fn test_empty_result() {
        let result = BatchResult::default();
        assert_eq!(result.total(), 0);
        assert_eq!(result.uploaded(), 0);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["mappings"], serde_json::json!({}));
    }
}
