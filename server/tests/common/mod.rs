//! Shared harness for HTTP tests: a fresh SQLite database and media root per
//! test, and a small request builder driving the router in-process.

#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Duration;
use recipe_server::auth::create_session;
use recipe_server::config::Config;
use recipe_server::db::DbConn;
use recipe_server::models::User;
use recipe_server::{build_router, users, AppState};
use serde::Serialize;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "testpass123";

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _dir: TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let config = Config {
            database_url: dir
                .path()
                .join("test.sqlite3")
                .to_string_lossy()
                .into_owned(),
            media_root: dir.path().join("media"),
            db_pool_size: 2,
            ..Config::default()
        };

        let state = AppState::from_config(config).expect("Failed to set up test database");
        let router = build_router(state.clone());

        Self {
            state,
            router,
            _dir: dir,
        }
    }

    pub fn conn(&self) -> DbConn {
        self.state.pool.get().expect("Failed to get connection")
    }

    pub fn media_root(&self) -> &Path {
        self.state.media.root()
    }

    pub fn create_user(&self, email: &str) -> User {
        let mut conn = self.conn();
        users::create_user(&mut conn, email, PASSWORD, "Test Name").expect("Failed to create user")
    }

    /// Issue a token directly, skipping the token endpoint.
    pub fn token_for(&self, user: &User) -> String {
        let mut conn = self.conn();
        create_session(&mut conn, user.id, Duration::days(1)).expect("Failed to create session")
    }

    /// A fresh user and a valid token for them.
    pub fn login(&self, email: &str) -> (User, String) {
        let user = self.create_user(email);
        let token = self.token_for(&user);
        (user, token)
    }

    pub async fn send(&self, request: TestRequest) -> TestResponse {
        request.send(self.router.clone()).await
    }
}

/// Helper to build and execute HTTP requests against the router
pub struct TestRequest {
    method: Method,
    uri: String,
    headers: Vec<(String, String)>,
    body: Option<Vec<u8>>,
}

const BOUNDARY: &str = "recipe-test-boundary";

impl TestRequest {
    fn new(method: Method, uri: &str) -> Self {
        Self {
            method,
            uri: uri.to_owned(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn get(uri: &str) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn post(uri: &str) -> Self {
        Self::new(Method::POST, uri)
    }

    pub fn put(uri: &str) -> Self {
        Self::new(Method::PUT, uri)
    }

    pub fn patch(uri: &str) -> Self {
        Self::new(Method::PATCH, uri)
    }

    pub fn delete(uri: &str) -> Self {
        Self::new(Method::DELETE, uri)
    }

    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_owned(), value.to_owned()));
        self
    }

    pub fn bearer(self, token: &str) -> Self {
        self.header(header::AUTHORIZATION.as_str(), &format!("Bearer {}", token))
    }

    pub fn json<T: Serialize>(mut self, data: &T) -> Self {
        self.body = Some(serde_json::to_vec(data).expect("Failed to serialize JSON"));
        self.header(header::CONTENT_TYPE.as_str(), "application/json")
    }

    /// A `multipart/form-data` body with a single file field.
    pub fn multipart(mut self, field: &str, filename: &str, data: &[u8]) -> Self {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, field, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        self.body = Some(body);
        self.header(
            header::CONTENT_TYPE.as_str(),
            &format!("multipart/form-data; boundary={}", BOUNDARY),
        )
    }

    pub async fn send(self, app: Router) -> TestResponse {
        let mut builder = Request::builder().method(self.method).uri(self.uri);

        for (key, value) in self.headers {
            builder = builder.header(key, value);
        }

        let request = builder
            .body(Body::from(self.body.unwrap_or_default()))
            .expect("Failed to build request");

        let response = app
            .oneshot(request)
            .await
            .expect("Failed to execute request");

        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read response body")
            .to_vec();

        TestResponse { status, body }
    }
}

pub struct TestResponse {
    status: StatusCode,
    body: Vec<u8>,
}

impl TestResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap_or_else(|e| {
            panic!(
                "Response was not JSON ({}): {}",
                e,
                String::from_utf8_lossy(&self.body)
            )
        })
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Assert the status, printing the body on mismatch.
    pub fn assert_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.status,
            expected,
            "unexpected status, body: {}",
            String::from_utf8_lossy(&self.body)
        );
        self
    }
}

/// A small valid PNG.
pub fn png_bytes() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(10, 10, image::Rgb([200, 120, 40]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    buf.into_inner()
}

/// IDs from a JSON array of objects.
pub fn ids(value: &Value) -> Vec<i64> {
    value
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["id"].as_i64().expect("item without id"))
        .collect()
}

/// Names from a JSON array of `{id, name}` objects.
pub fn names(value: &Value) -> Vec<String> {
    value
        .as_array()
        .expect("expected a JSON array")
        .iter()
        .map(|item| item["name"].as_str().expect("item without name").to_string())
        .collect()
}
