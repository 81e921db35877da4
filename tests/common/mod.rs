#![allow(dead_code)]

use std::{path::PathBuf, sync::Arc, time::Duration};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use pos_backoffice::{
    config::{AppState, Config},
    db::MemoryStore,
    routes,
    services::asset_store::LocalAssetStore,
};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub upload_dir: PathBuf,
    // dropped with the app, removing every uploaded file
    _workspace: TempDir,
}

pub fn test_config(upload_dir: PathBuf) -> Config {
    Config {
        database_url: None,
        jwt_secret: "integration-secret".to_string(),
        token_ttl_hours: 8,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        db_max_connections: 1,
        storage_timeout: Duration::from_secs(5),
        upload_dir,
        max_upload_bytes: 1024,
        bcrypt_cost: 4,
        admin_seed: None,
    }
}

/// Router over a fresh in-memory store with one administrator seeded.
pub async fn spawn_app() -> TestApp {
    let workspace = tempfile::tempdir().expect("temp dir");
    let upload_dir = workspace.path().join("uploads");
    build_app(workspace, upload_dir).await
}

/// Same app, but the upload root is a regular file so every asset write or
/// delete fails.
pub async fn spawn_app_with_broken_uploads() -> TestApp {
    let workspace = tempfile::tempdir().expect("temp dir");
    let upload_dir = workspace.path().join("uploads");
    std::fs::write(&upload_dir, b"").expect("placeholder file");
    build_app(workspace, upload_dir).await
}

async fn build_app(workspace: TempDir, upload_dir: PathBuf) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::with_stores(
        test_config(upload_dir.clone()),
        store.clone(),
        store,
        Arc::new(LocalAssetStore::new(upload_dir.clone())),
    );

    state
        .auth_service
        .ensure_admin(ADMIN_USERNAME, ADMIN_PASSWORD, "Administrator")
        .await
        .expect("seed admin");

    TestApp {
        router: routes::router(state.clone()),
        state,
        upload_dir,
        _workspace: workspace,
    }
}

impl TestApp {
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn login(&self, username: &str, password: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": username, "password": password })),
        )
        .await
    }

    pub async fn admin_token(&self) -> String {
        let (status, body) = self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn register(&self, username: &str, nisn: &str) -> (StatusCode, Value) {
        self.request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "nisn": nisn,
                "username": username,
                "password": "rahasia123",
                "fullName": "Siti Aminah",
                "studentClass": "XII",
                "major": "AK"
            })),
        )
        .await
    }

    pub async fn employee_token(&self, username: &str, nisn: &str) -> String {
        let (status, body) = self.register(username, nisn).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let (status, body) = self.login(username, "rahasia123").await;
        assert_eq!(status, StatusCode::OK, "{body}");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    pub async fn create_category(&self, token: &str, name: &str) -> String {
        let (status, body) = self
            .request(Method::POST, "/api/categories", Some(token), Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"]["id"].as_str().unwrap().to_string()
    }

    pub async fn create_product(&self, token: &str, product: Value) -> Value {
        let (status, body) = self
            .request(Method::POST, "/api/products", Some(token), Some(product))
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["data"].clone()
    }
}

pub fn product(name: &str, qty: i32, price: f64, category_id: Option<&str>) -> Value {
    json!({
        "name": name,
        "categoryId": category_id,
        "qty": qty,
        "supplier": "PT Sumber Makmur",
        "price": price,
    })
}
