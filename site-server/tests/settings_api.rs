//! HTTP API tests for the settings endpoints
//!
//! Drives the full router (auth middleware included) in-process.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use site_server::auth::password::hash_password;
use site_server::auth::{JwtConfig, JwtService};
use site_server::utils::validation::MAX_DATA_URI_LEN;
use site_server::{Config, ServerState, SettingsStore, build_router};

const ADMIN_PASSWORD: &str = "correct horse battery staple";

struct TestServer {
    app: Router,
    _work_dir: tempfile::TempDir,
}

fn setup() -> TestServer {
    let work_dir = tempfile::tempdir().unwrap();

    let mut config = Config::with_overrides(work_dir.path().to_string_lossy(), 0);
    config.jwt = JwtConfig::with_secret("integration-test-secret-at-least-32-chars");
    config.admin.username = "admin".to_string();
    config.admin.password_hash = Some(hash_password(ADMIN_PASSWORD).unwrap());
    config.max_upload_bytes = 1024 * 1024;

    let jwt = Arc::new(JwtService::with_config(config.jwt.clone()));
    let state = ServerState::new(config, SettingsStore::open_in_memory().unwrap(), jwt);

    TestServer {
        app: build_router(state),
        _work_dir: work_dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

async fn send_json(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, request).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn json_request(method: Method, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, body) = send_json(
        app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            &json!({"username": "admin", "password": ADMIN_PASSWORD}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_is_public() {
    let server = setup();
    let (status, body) = send_json(&server.app, get_request("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_get_settings_before_any_write_returns_empty_document() {
    let server = setup();
    let (status, body) = send_json(&server.app, get_request("/api/settings")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logo"], "");
    assert_eq!(body["heroImages"]["home"], "");
    assert!(body["contact"]["phone"].is_null());
}

#[tokio::test]
async fn test_put_settings_requires_auth() {
    let server = setup();
    let (status, _) = send_json(
        &server.app,
        json_request(Method::PUT, "/api/settings", None, &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send_json(
        &server.app,
        json_request(Method::PUT, "/api/settings", Some("garbage"), &json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_put_then_get_returns_stored_document() {
    let server = setup();
    let token = login(&server.app).await;

    let document = json!({
        "contact": {
            "phone": "+62 811 0000 111",
            "email": {"sales": "sales@example.com"},
            "address": {"city": "Denpasar"}
        },
        "heroImages": {"home": "/uploads/home.jpg"},
        "logo": "https://cdn.example.com/logo.svg",
        "profile": {"name": "Operator", "avatar": "data:image/png;base64,iVBORw0KGgo="}
    });

    let (status, stored) = send_json(
        &server.app,
        json_request(Method::PUT, "/api/settings", Some(&token), &document),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored["contact"]["phone"], "+62 811 0000 111");

    let (status, fetched) = send_json(&server.app, get_request("/api/settings")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, stored);
    assert_eq!(fetched["heroImages"]["home"], "/uploads/home.jpg");
    assert_eq!(fetched["heroImages"]["about"], "");
}

#[tokio::test]
async fn test_put_is_whole_document_replace() {
    let server = setup();
    let token = login(&server.app).await;

    send_json(
        &server.app,
        json_request(
            Method::PUT,
            "/api/settings",
            Some(&token),
            &json!({"contact": {"phone": "111"}, "logo": "/uploads/a.png"}),
        ),
    )
    .await;
    send_json(
        &server.app,
        json_request(
            Method::PUT,
            "/api/settings",
            Some(&token),
            &json!({"contact": {"phone": "222"}}),
        ),
    )
    .await;

    let (_, fetched) = send_json(&server.app, get_request("/api/settings")).await;
    assert_eq!(fetched["contact"]["phone"], "222");
    assert_eq!(fetched["logo"], "");
}

#[tokio::test]
async fn test_put_rejects_unrecognized_image_reference() {
    let server = setup();
    let token = login(&server.app).await;

    let (status, body) = send_json(
        &server.app,
        json_request(
            Method::PUT,
            "/api/settings",
            Some(&token),
            &json!({"logo": "images/logo.png"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);
    assert_eq!(body["details"]["field"], "logo");

    // Nothing was stored
    let (_, fetched) = send_json(&server.app, get_request("/api/settings")).await;
    assert_eq!(fetched["logo"], "");
}

#[tokio::test]
async fn test_put_accepts_data_uri_above_default_body_limit() {
    let server = setup();
    let token = login(&server.app).await;

    // Larger than axum's 2 MB default, within the per-field cap
    let prefix = "data:image/png;base64,";
    let logo = format!("{prefix}{}", "A".repeat(MAX_DATA_URI_LEN - prefix.len()));

    let (status, body) = send_json(
        &server.app,
        json_request(Method::PUT, "/api/settings", Some(&token), &json!({"logo": logo})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["logo"].as_str().map(str::len), Some(MAX_DATA_URI_LEN));
}

#[tokio::test]
async fn test_put_rejects_oversized_data_uri_with_validation_error() {
    let server = setup();
    let token = login(&server.app).await;

    let logo = format!("data:image/png;base64,{}", "A".repeat(MAX_DATA_URI_LEN));

    let (status, body) = send_json(
        &server.app,
        json_request(Method::PUT, "/api/settings", Some(&token), &json!({"logo": logo})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 4002);
    assert_eq!(body["details"]["field"], "logo");
}

#[tokio::test]
async fn test_login_with_wrong_password_fails() {
    let server = setup();
    let (status, body) = send_json(
        &server.app,
        json_request(
            Method::POST,
            "/api/auth/login",
            None,
            &json!({"username": "admin", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], 1002);
}

fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::new(3, 3);
    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
    buf.into_inner()
}

fn multipart_request(token: &str, filename: &str, data: &[u8]) -> Request<Body> {
    let boundary = "----site-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/uploads")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_upload_then_serve() {
    let server = setup();
    let token = login(&server.app).await;
    let png = png_bytes();

    let (status, first) =
        send_json(&server.app, multipart_request(&token, "Logo.PNG", &png)).await;
    assert_eq!(status, StatusCode::OK);
    let path = first["path"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/"));
    assert!(path.ends_with(".png"));

    // Same content, same reference
    let (_, second) = send_json(&server.app, multipart_request(&token, "copy.png", &png)).await;
    assert_eq!(second["path"], first["path"]);

    let response = server.app.clone().oneshot(get_request(&path)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    let served = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(served.as_ref(), png.as_slice());
}

#[tokio::test]
async fn test_upload_rejects_bad_input() {
    let server = setup();
    let token = login(&server.app).await;

    let (status, body) =
        send_json(&server.app, multipart_request(&token, "a.gif", &png_bytes())).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["code"], 5002);

    let (status, body) =
        send_json(&server.app, multipart_request(&token, "a.png", b"plain text")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 5003);

    let (status, _) = send(&server.app, get_request("/uploads/missing.png")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let server = setup();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/uploads")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&server.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
