//! HTTP API tests for the image routes.
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{gif_bytes, jpeg_bytes, png_bytes, post, TestHarness};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BOUNDARY: &str = "inkpost-test-boundary";

/// Helper to get response body as bytes
async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

async fn body_json(body: Body) -> Value {
    serde_json::from_slice(&body_bytes(body).await).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn multipart_request(post_id: Option<&str>, file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    if let Some(id) = post_id {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"postId\"\r\n\r\n{id}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((name, data)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::post("/api/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let harness = TestHarness::new();
    let response = harness
        .router()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let harness = TestHarness::new();
    let response = harness
        .router()
        .oneshot(
            Request::post("/api/upload/from-url")
                .header(header::CONTENT_TYPE, "application/json")
                .header("x-request-id", "req-abc")
                .body(Body::from(json!({ "postId": 1 }).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(response.headers()["x-request-id"], "req-abc");
    let json = body_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "invalid_input");
    assert_eq!(json["request_id"], "req-abc");
}

#[tokio::test]
async fn test_upload_then_serve_round_trip() {
    let harness = TestHarness::new();
    let data = png_bytes();

    let response = harness
        .router()
        .oneshot(multipart_request(Some("5"), Some(("diagram.jpg", &data))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert!(json["id"].is_string());
    let url = json["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/images/5/"));
    // Extension follows the content, not the uploaded name.
    assert!(url.ends_with(".png"));

    let response = harness
        .router()
        .oneshot(Request::get(url.as_str()).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CACHE_CONTROL],
        "public, max-age=31536000, immutable"
    );
    assert_eq!(body_bytes(response.into_body()).await, data);
}

#[tokio::test]
async fn test_upload_runs_detection_and_validation() {
    let harness = TestHarness::new();

    let response = harness
        .router()
        .oneshot(multipart_request(Some("5"), Some(("notes.png", &[b'x'; 300]))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "unsupported_format");

    let mut truncated = jpeg_bytes(400);
    truncated.truncate(350);
    let response = harness
        .router()
        .oneshot(multipart_request(Some("5"), Some(("cut.jpg", &truncated))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "corrupt_file");

    assert_eq!(harness.files_on_disk(post(5)), 0);
}

#[tokio::test]
async fn test_upload_missing_fields() {
    let harness = TestHarness::new();

    let response = harness
        .router()
        .oneshot(multipart_request(None, Some(("a.gif", &gif_bytes()))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .router()
        .oneshot(multipart_request(Some("5"), None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .router()
        .oneshot(multipart_request(Some("-1"), Some(("a.gif", &gif_bytes()))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_from_url_success_and_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cat.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(gif_bytes()))
        .mount(&server)
        .await;

    let harness = TestHarness::new();
    let source = format!("{}/cat.gif", server.uri());

    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-url",
            json!({ "url": &source, "postId": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["originalUrl"], source.as_str());
    assert!(json["url"].as_str().unwrap().starts_with("/images/9/"));

    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-url",
            json!({ "url": format!("{}/nope.gif", server.uri()), "postId": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response.into_body()).await;
    assert_eq!(json["code"], "fetch_failed");

    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-url",
            json!({ "url": "ftp://example.com/a.png", "postId": 9 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .router()
        .oneshot(
            Request::post("/api/upload/from-url")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_from_urls_batch_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(jpeg_bytes(512)))
        .mount(&server)
        .await;

    let harness = TestHarness::new();
    let ok = format!("{}/a.jpg", server.uri());
    let missing = format!("{}/b.jpg", server.uri());

    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-urls",
            json!({ "urls": [&ok, &missing], "postId": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["total"], 2);
    assert_eq!(json["uploaded"], 1);
    assert_eq!(json["failed"], json!([&missing]));
    assert_eq!(json["mappings"][missing.as_str()], missing.as_str());
    assert!(json["mappings"][ok.as_str()]
        .as_str()
        .unwrap()
        .starts_with("/images/3/"));
}

#[tokio::test]
async fn test_from_urls_size_limits() {
    let harness = TestHarness::new();

    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-urls",
            json!({ "urls": [], "postId": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let urls: Vec<String> = (0..21).map(|i| format!("https://x.example/{i}.png")).collect();
    let response = harness
        .router()
        .oneshot(json_request(
            "/api/upload/from-urls",
            json!({ "urls": urls, "postId": 3 }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .router()
        .oneshot(json_request("/api/upload/from-urls", json!({ "postId": 3 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_post_images() {
    let harness = TestHarness::new();
    let first = harness
        .service
        .store_upload(post(11), gif_bytes(), Some("one.gif"))
        .await
        .unwrap();
    let second = harness
        .service
        .store_upload(post(11), png_bytes(), None)
        .await
        .unwrap();
    harness
        .service
        .store_upload(post(12), png_bytes(), None)
        .await
        .unwrap();

    let response = harness
        .router()
        .oneshot(Request::get("/api/posts/11/images").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response.into_body()).await;
    let list = json.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], second.id.to_string());
    assert_eq!(list[0]["originalName"], "image.png");
    assert_eq!(list[1]["id"], first.id.to_string());
    assert_eq!(list[1]["detectedType"], "gif");
    assert_eq!(list[1]["postId"], 11);
}

#[tokio::test]
async fn test_serve_rejects_bad_paths() {
    let harness = TestHarness::new();

    let response = harness
        .router()
        .oneshot(Request::get("/images/1/missing.jpg").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().get(header::CACHE_CONTROL).is_none());
    let json = body_json(response.into_body()).await;
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "not_found");

    let response = harness
        .router()
        .oneshot(Request::get("/images/1/..%2Fsecret").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = harness
        .router()
        .oneshot(Request::get("/images/zero/a.jpg").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_serve_unknown_extension_defaults_to_jpeg() {
    let harness = TestHarness::new();
    harness
        .service
        .storage()
        .write_file(post(2), "legacy.bin", &jpeg_bytes(128))
        .unwrap();

    let response = harness
        .router()
        .oneshot(Request::get("/images/2/legacy.bin").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
}
