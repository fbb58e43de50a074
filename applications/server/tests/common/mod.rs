//! Common test utilities and fixtures
//!
//! Every test app runs the real router against a SQLite file inside a
//! temporary directory, an in-process cache and a producer that records
//! messages instead of sending them.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use freetunes_core::{types::CreateUser, UserId};
use freetunes_server::{
    api,
    config::ServerSettings,
    services::{AuthService, FileStorage, MemoryCache, MessageProducer},
    state::AppState,
};
use freetunes_storage::{users, Database};
use serde_json::Value;
use std::{num::NonZeroUsize, sync::Arc, sync::Mutex, time::Duration};
use tempfile::TempDir;
use tower::util::ServiceExt;

pub const TEST_PASSWORD: &str = "TestPassword123!";
pub const PUBLIC_URL: &str = "http://localhost:5000";

/// Producer that keeps every message for later inspection
#[derive(Default)]
pub struct RecordingProducer {
    messages: Mutex<Vec<(String, Value)>>,
}

impl RecordingProducer {
    /// Wait for the background publish of `routing_key` to land
    pub async fn wait_for(&self, routing_key: &str) -> Value {
        for _ in 0..200 {
            if let Some(payload) = self.find(routing_key) {
                return payload;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no message published to {routing_key}");
    }

    pub fn find(&self, routing_key: &str) -> Option<Value> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(key, _)| key == routing_key)
            .map(|(_, payload)| payload.clone())
    }
}

#[async_trait]
impl MessageProducer for RecordingProducer {
    async fn send(&self, routing_key: &str, payload: &Value) -> freetunes_server::Result<()> {
        self.messages
            .lock()
            .unwrap()
            .push((routing_key.to_string(), payload.clone()));
        Ok(())
    }
}

/// Decoded response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// `data` member of the envelope
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub producer: Arc<RecordingProducer>,
    _temp_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());
        let db = Database::connect(&db_url)
            .await
            .expect("Failed to open database");

        let file_storage = FileStorage::new(temp_dir.path().join("uploads"), PUBLIC_URL);
        file_storage.initialize().await.unwrap();

        // Cheap hashing keeps the suite fast
        let auth_service =
            AuthService::new("test-secret-key".to_string(), 1, 1).with_bcrypt_cost(4);

        let cache = Arc::new(MemoryCache::new(NonZeroUsize::new(1000).unwrap()));
        let codes = Arc::new(MemoryCache::new(NonZeroUsize::new(100).unwrap()));
        let producer = Arc::new(RecordingProducer::default());

        let state = AppState::new(
            db,
            Arc::new(auth_service),
            Arc::new(file_storage),
            cache,
            codes,
            producer.clone(),
        );
        let settings = ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            public_url: PUBLIC_URL.to_string(),
            cors_origins: Vec::new(),
        };
        let router = api::router(state.clone(), &settings);

        Self {
            router,
            state,
            producer,
            _temp_dir: temp_dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// JSON request, optionally with a bearer token
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        self.send(builder.body(body).unwrap()).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        self.request(Method::DELETE, uri, token, body).await
    }

    /// Single-file multipart upload
    pub async fn upload(
        &self,
        uri: &str,
        token: &str,
        field: &str,
        filename: &str,
        content_type: &str,
        data: &[u8],
    ) -> TestResponse {
        let boundary = "freetunes-test-boundary";
        let mut body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(data);
        body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Verified account plus an access token for it
    pub async fn create_user(&self, username: &str) -> (UserId, String) {
        let password_hash = self.state.auth_service.hash_password(TEST_PASSWORD).unwrap();
        let user_id = users::create(
            self.state.pool(),
            &CreateUser {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password_hash,
                fullname: format!("{username} fullname"),
            },
        )
        .await
        .unwrap();
        users::activate(self.state.pool(), &user_id).await.unwrap();

        let token = self.state.auth_service.create_access_token(&user_id).unwrap();
        (user_id, token)
    }

    pub async fn create_album(&self, token: &str, name: &str) -> String {
        let response = self
            .post("/albums", Some(token), serde_json::json!({"name": name, "year": 2020}))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.data()["albumId"].as_str().unwrap().to_string()
    }

    pub async fn create_song(&self, token: &str, title: &str, album_id: Option<&str>) -> String {
        let mut body = serde_json::json!({
            "title": title,
            "year": 2021,
            "genre": "genre-pop",
            "duration": 200,
        });
        if let Some(album_id) = album_id {
            body["albumId"] = Value::from(album_id);
        }

        let response = self.post("/songs", Some(token), body).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.data()["songId"].as_str().unwrap().to_string()
    }

    pub async fn create_playlist(&self, token: &str, name: &str, is_public: bool) -> String {
        let response = self
            .post(
                "/playlists",
                Some(token),
                serde_json::json!({"name": name, "isPublic": is_public}),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.data()["playlistId"].as_str().unwrap().to_string()
    }
}
