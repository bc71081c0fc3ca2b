//! Single-image fetcher: download a remote image and store it for a post.

use inkpost_common::{Error, PostId, Result};
use inkpost_db::models::ImageRecord;
use reqwest::{redirect, Client, StatusCode, Url};

use super::ingest::{too_large, Ingestor};
use crate::config::FetchConfig;

/// Downloads images over HTTP(S) and hands them to the ingest pipeline.
///
/// One client is shared by every fetch, so connection pooling and the
/// configured timeouts apply across a whole batch.
pub struct ImageFetcher {
    client: Client,
    ingestor: Ingestor,
}

impl ImageFetcher {
    pub fn new(config: &FetchConfig, ingestor: Ingestor) -> Result<Self> {
        let max_redirects = config.max_redirects;
        let policy = redirect::Policy::custom(move |attempt| {
            let hops = attempt.previous().len();
            match redirect_decision(attempt.previous().last(), attempt.url(), hops, max_redirects) {
                RedirectDecision::Follow => attempt.follow(),
                // Hands the 3xx back to the caller, which reports it as a failed fetch.
                RedirectDecision::Stop => attempt.stop(),
                RedirectDecision::TooMany => attempt.error("too many redirects"),
            }
        });

        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.as_str())
            .redirect(policy)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, ingestor })
    }

    /// Download `url` and store it under `post_id`.
    ///
    /// No retries happen here; callers decide what to do with a failure.
    pub async fn fetch_and_store(&self, url: &str, post_id: PostId) -> Result<ImageRecord> {
        let parsed = parse_image_url(url)?;
        tracing::debug!(url = %parsed, post_id = %post_id, "Fetching image");

        let data = self.download(parsed.clone()).await?;
        let name_hint = filename_from_url(&parsed);

        self.ingestor
            .ingest(post_id, data, name_hint.as_deref())
            .await
    }

    async fn download(&self, url: Url) -> Result<Vec<u8>> {
        let max = self.ingestor.max_bytes();

        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::fetch_failed(format!("HTTP status {status}")));
        }

        if let Some(len) = response.content_length() {
            if len > max as u64 {
                return Err(too_large(len as usize, max));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_error)? {
            let new_len = body.len() + chunk.len();
            if new_len > max {
                return Err(too_large(new_len, max));
            }
            body.extend_from_slice(&chunk);
        }

        if body.is_empty() {
            return Err(Error::fetch_failed("empty response body"));
        }

        Ok(body)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RedirectDecision {
    Follow,
    Stop,
    TooMany,
}

/// Decide what to do with a redirect to `next`.
///
/// `hops` counts every URL already requested, the original one included, so
/// the hop being decided is number `hops`. An https page never hands off to
/// plain http.
fn redirect_decision(prev: Option<&Url>, next: &Url, hops: usize, max: usize) -> RedirectDecision {
    if hops > max {
        return RedirectDecision::TooMany;
    }
    let downgrade = next.scheme() == "http" && prev.is_some_and(|p| p.scheme() == "https");
    if downgrade {
        RedirectDecision::Stop
    } else {
        RedirectDecision::Follow
    }
}

/// Parse `raw` as an absolute `http` or `https` URL.
pub fn parse_image_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| Error::invalid_input(format!("invalid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(Error::invalid_input(format!(
            "unsupported URL scheme: {other}"
        ))),
    }
}

/// Last non-empty path segment of `url`, without query or fragment.
pub fn filename_from_url(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|s| !s.is_empty())
        .last()
        .map(str::to_string)
}

fn request_error(e: reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::fetch_failed(format!("request timed out: {e}"))
    } else if e.is_redirect() {
        Error::fetch_failed(format!("redirect rejected: {e}"))
    } else {
        Error::fetch_failed(e.to_string())
    }
}
