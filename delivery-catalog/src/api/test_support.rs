//! Request builders and app wiring shared by the router tests

use std::io::Cursor;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, header};
use axum::response::Response;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use super::create_router;
use crate::auth::identity::create_token;
use crate::config::Config;
use crate::services::storage::testing::RecordingStorage;
use crate::state::AppState;

const BOUNDARY: &str = "XBOUNDARY";

/// App over the lazy test pool
pub fn app() -> Router {
    create_router(AppState::for_tests(Config::for_tests()))
}

/// App over a live pool, with the storage handle for assertions
pub fn app_with_pool(pool: PgPool) -> (Router, Arc<RecordingStorage>) {
    let storage = Arc::new(RecordingStorage::default());
    let state = AppState::with_pool(Config::for_tests(), pool, storage.clone());
    (create_router(state), storage)
}

pub fn token(user_id: i64, role: &str) -> String {
    create_token(user_id, "user@shop.ua", role, "test-secret", chrono::Duration::hours(1)).unwrap()
}

pub async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

pub async fn body_text(resp: Response) -> String {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(resp: Response) -> Value {
    serde_json::from_str(&body_text(resp).await).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn request(method: Method, uri: &str, bearer: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: Method, uri: &str, bearer: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(t) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// Multipart body with a `data` JSON part and an optional JPEG `image` part
pub fn multipart_request(
    method: Method,
    uri: &str,
    bearer: &str,
    data: &Value,
    image: Option<Vec<u8>>,
) -> Request<Body> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"data\"\r\n\
         Content-Type: application/json\r\n\r\n{data}\r\n"
    )
    .into_bytes();
    if let Some(bytes) = image {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; \
                 filename=\"photo.jpg\"\r\nContent-Type: image/jpeg\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(method)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {bearer}"))
        .body(Body::from(body))
        .unwrap()
}

/// A small valid JPEG
pub fn jpeg() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(ImageBuffer::from_pixel(16, 16, Rgb([220u8, 120, 40])));
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Jpeg).unwrap();
    bytes
}

/// Create an active store through the API and return its id
pub async fn create_store(app: &Router, owner: &str, name: &str) -> i64 {
    let body = serde_json::json!({
        "name": name,
        "address": {
            "street": "Khreshchatyk 1",
            "city": "Kyiv",
            "latitude": 50.45,
            "longitude": 30.52
        }
    });
    let resp = send(app, json_request(Method::POST, "/api/stores/simple", Some(owner), &body)).await;
    assert_eq!(resp.status(), axum::http::StatusCode::CREATED);
    body_json(resp).await["store"]["id"].as_i64().unwrap()
}

/// Create a category with an uploaded image and return its id
pub async fn create_category(app: &Router, admin: &str, name: &str) -> i64 {
    let data = serde_json::json!({ "name": name });
    let resp = send(
        app,
        multipart_request(Method::POST, "/api/categories", admin, &data, Some(jpeg())),
    )
    .await;
    assert_eq!(resp.status(), axum::http::StatusCode::CREATED);
    body_json(resp).await["category"]["id"].as_i64().unwrap()
}
