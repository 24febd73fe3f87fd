// HTTP front unit tests

use bytes::Bytes;
use catalog_resizer::config::{BulkSize, Config};
use catalog_resizer::server::{handle_request, AppState};
use catalog_resizer::store::{BlobStore, MemoryBlobStore};
use http::{header, Method, Request, StatusCode};
use http_body_util::Full;
use std::sync::Arc;

use super::fixtures::opaque_png;

fn state() -> (Arc<MemoryBlobStore>, AppState) {
    let store = Arc::new(MemoryBlobStore::new());
    let mut config = Config::new("assets", "https://cdn.example.com/");
    config.bulk.sizes = vec![BulkSize::new(10, 10)];
    config.bulk.format = "png".into();
    let state = AppState::new(store.clone() as Arc<dyn BlobStore>, Arc::new(config));
    (store, state)
}

fn request(method: Method, uri: &str, body: &'static str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Full::new(Bytes::from_static(body.as_bytes())))
        .unwrap()
}

// Test: GET with a key redirects to the stored variant
#[tokio::test]
async fn test_get_redirects() {
    let (store, state) = state();
    store.insert("catalog/products/images/a.png", opaque_png(20, 20));

    let response = handle_request(
        &state,
        request(Method::GET, "/?key=12%2F2%2Fproducts%2F10%2F10%2Fa.png", ""),
    )
    .await;

    assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://cdn.example.com/12/2/products/10/10/a.png"
    );
    assert_eq!(response.headers()[header::CACHE_CONTROL], "max-age=0");
}

// Test: unroutable key maps to 404
#[tokio::test]
async fn test_get_unroutable_is_not_found() {
    let (_, state) = state();
    let response = handle_request(&state, request(Method::GET, "/?key=nope", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Test: missing key parameter is a bad request
#[tokio::test]
async fn test_get_without_key() {
    let (_, state) = state();
    let response = handle_request(&state, request(Method::GET, "/", "")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// Test: POST /events runs bulk generation
#[tokio::test]
async fn test_post_event() {
    let (store, state) = state();
    store.insert("catalog/products/images/a.png", opaque_png(20, 20));

    let body = r#"{"Records":[{"s3":{"bucket":{"name":"assets"},"object":{"key":"catalog/products/images/a.png"}}}]}"#;
    let response = handle_request(&state, request(Method::POST, "/events", body)).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(store.object("1/3/images/products/10/10/a.png.png").is_some());
}

// Test: malformed event body is a bad request
#[tokio::test]
async fn test_post_malformed_event() {
    let (_, state) = state();
    let response = handle_request(&state, request(Method::POST, "/events", "{not json")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// Test: unknown paths are 404
#[tokio::test]
async fn test_unknown_path() {
    let (_, state) = state();
    let response = handle_request(&state, request(Method::GET, "/health", "")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// Test: a base URL that cannot form a Location header answers 500
#[tokio::test]
async fn test_unusable_location_is_server_error() {
    let store = Arc::new(MemoryBlobStore::new());
    store.insert("catalog/products/images/a.png", opaque_png(20, 20));
    let config = Config::new("assets", "https://cdn.example.com/\n");
    let state = AppState::new(store.clone() as Arc<dyn BlobStore>, Arc::new(config));

    let response = handle_request(
        &state,
        request(Method::GET, "/?key=12%2F2%2Fproducts%2F10%2F10%2Fa.png", ""),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::LOCATION).is_none());
}
