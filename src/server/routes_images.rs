//! Image upload, URL ingestion and serving routes.

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use inkpost_common::{Error, PostId};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

use super::error::AppError;
use super::request_id::RequestId;
use super::AppContext;
use crate::images::BatchResult;

/// API routes, nested under `/api`.
pub fn image_api_routes() -> Router<AppContext> {
    Router::new()
        .route("/upload", post(upload_image))
        .route("/upload/from-url", post(upload_from_url))
        .route("/upload/from-urls", post(upload_from_urls))
        .route("/posts/:post_id/images", get(list_post_images))
}

/// Public image serving, mounted at the root so stored paths resolve as-is.
pub fn image_file_routes() -> Router<AppContext> {
    Router::new().route("/images/:post_id/:filename", get(serve_image))
}

// ============================================================================
// Request / response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromUrlRequest {
    pub url: Option<String>,
    pub post_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FromUrlsRequest {
    pub urls: Option<Vec<String>>,
    pub post_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    pub id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FromUrlResponse {
    pub success: bool,
    pub url: String,
    pub id: String,
    pub original_url: String,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub success: bool,
    #[serde(flatten)]
    pub result: BatchResult,
}

// ============================================================================
// Handlers
// ============================================================================

/// Store a multipart upload (`file` + `postId`).
async fn upload_image(
    State(ctx): State<AppContext>,
    rid: RequestId,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let fail = |e: Error| AppError::new(e).with_request_id(&rid);

    let mut file: Option<(Vec<u8>, Option<String>)> = None;
    let mut post_id: Option<PostId> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| fail(Error::invalid_input(format!("malformed multipart body: {e}"))))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let name = field.file_name().map(str::to_string);
                let data = field.bytes().await.map_err(|e| {
                    fail(Error::invalid_input(format!("failed to read upload: {e}")))
                })?;
                file = Some((data.to_vec(), name));
            }
            Some("postId") => {
                let text = field.text().await.map_err(|e| {
                    fail(Error::invalid_input(format!("failed to read postId: {e}")))
                })?;
                post_id = Some(text.parse().map_err(fail)?);
            }
            _ => {}
        }
    }

    let (data, name) = file.ok_or_else(|| fail(Error::invalid_input("missing file field")))?;
    let post_id = post_id.ok_or_else(|| fail(Error::invalid_input("missing postId field")))?;

    let record = ctx
        .images
        .store_upload(post_id, data, name.as_deref())
        .await
        .map_err(fail)?;

    Ok(Json(UploadResponse {
        success: true,
        url: record.storage_path,
        id: record.id.to_string(),
    }))
}

/// Fetch a single remote image for a post.
async fn upload_from_url(
    State(ctx): State<AppContext>,
    rid: RequestId,
    payload: Result<Json<FromUrlRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let fail = |e: Error| AppError::new(e).with_request_id(&rid);

    let Json(req) = payload.map_err(|e| fail(Error::invalid_input(e.body_text())))?;
    let url = req
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| fail(Error::invalid_input("url is required")))?;
    let post_id = required_post_id(req.post_id).map_err(fail)?;

    let record = ctx.images.fetch_one(&url, post_id).await.map_err(fail)?;

    Ok(Json(FromUrlResponse {
        success: true,
        url: record.storage_path,
        id: record.id.to_string(),
        original_url: url,
    }))
}

/// Fetch a batch of remote images for a post.
async fn upload_from_urls(
    State(ctx): State<AppContext>,
    rid: RequestId,
    payload: Result<Json<FromUrlsRequest>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let fail = |e: Error| AppError::new(e).with_request_id(&rid);

    let Json(req) = payload.map_err(|e| fail(Error::invalid_input(e.body_text())))?;
    let urls = req
        .urls
        .ok_or_else(|| fail(Error::invalid_input("urls is required")))?;
    let post_id = required_post_id(req.post_id).map_err(fail)?;

    let result = ctx.images.fetch_many(&urls, post_id).await.map_err(fail)?;

    Ok(Json(BatchResponse {
        success: true,
        result,
    }))
}

/// List stored images for a post, newest first.
async fn list_post_images(
    State(ctx): State<AppContext>,
    rid: RequestId,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let fail = |e: Error| AppError::new(e).with_request_id(&rid);

    let post_id: PostId = post_id.parse().map_err(fail)?;
    let images = ctx.images.list_for_post(post_id).await.map_err(fail)?;
    Ok(Json(images))
}

/// Serve a stored image file.
///
/// The content type comes from the filename's extension; the bytes are not
/// re-validated.
async fn serve_image(
    State(ctx): State<AppContext>,
    rid: RequestId,
    Path((post_id, filename)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let fail = |e: Error| AppError::new(e).with_request_id(&rid);

    let post_id: PostId = post_id.parse().map_err(fail)?;
    let (path, content_type) = ctx.images.image_path(post_id, &filename).map_err(fail)?;

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            fail(Error::not_found("image", format!("{post_id}/{filename}")))
        } else {
            fail(e.into())
        }
    })?;

    let stream = ReaderStream::new(file);
    let body = Body::from_stream(stream);

    Ok((
        StatusCode::OK,
        [
            (header::CACHE_CONTROL, "public, max-age=31536000, immutable"),
            (header::CONTENT_TYPE, content_type),
        ],
        body,
    ))
}

// ============================================================================
// Helpers
// ============================================================================

fn required_post_id(raw: Option<i64>) -> Result<PostId, Error> {
    let raw = raw.ok_or_else(|| Error::invalid_input("postId is required"))?;
    PostId::new(raw)
}
