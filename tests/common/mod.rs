#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use boutique_api::{
    config::AppConfig,
    db,
    events::{self, EventSender},
    handlers::AppServices,
    middleware_helpers::request_id::request_id_middleware,
    AppState,
};
use serde_json::{json, Value};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Test harness around an application router backed by an in-memory SQLite
/// database with a freshly migrated schema.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    token: String,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // A single pooled connection keeps the in-memory database alive and
        // shared for the whole test.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let db_arc = Arc::new(pool);
        let services = AppServices::new(db_arc.clone(), Arc::new(event_sender.clone()));
        let token = cfg.admin_token.clone();

        let state = AppState {
            db: db_arc,
            config: cfg,
            event_sender,
            services,
        };

        let router = Router::new()
            .nest("/api/v1", boutique_api::api_v1_routes())
            .layer(axum::middleware::from_fn(request_id_middleware))
            .with_state(state.clone());

        Self {
            router,
            state,
            token,
            _event_task: event_task,
        }
    }

    /// Issues a request against the router, returning status and parsed body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        authed: bool,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if authed {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token));
        }

        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .expect("failed to build request"),
            None => builder.body(Body::empty()).expect("failed to build request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body is not JSON")
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, false).await
    }

    pub async fn get_authed(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None, true).await
    }

    pub async fn post_authed(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body), true).await
    }

    pub async fn put_authed(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body), true).await
    }

    pub async fn delete_authed(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None, true).await
    }

    /// Creates a category and returns its ID.
    pub async fn create_category(&self, name: &str) -> Uuid {
        let (status, body) = self
            .post_authed("/api/v1/categories", json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "category create failed: {body}");
        parse_id(&body)
    }

    /// Creates a product in the given category and returns its ID.
    pub async fn create_product(&self, payload: Value) -> Uuid {
        let (status, body) = self.post_authed("/api/v1/products", payload).await;
        assert_eq!(status, StatusCode::CREATED, "product create failed: {body}");
        parse_id(&body)
    }
}

/// Extracts the `id` field of a JSON response.
pub fn parse_id(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|s| Uuid::parse_str(s).ok())
        .unwrap_or_else(|| panic!("response has no id: {body}"))
}

/// Parses a price field that rust_decimal serialized as a JSON string.
pub fn parse_decimal(value: &Value) -> rust_decimal::Decimal {
    match value {
        Value::String(s) => s.parse().expect("invalid decimal string"),
        Value::Number(n) => n.to_string().parse().expect("invalid decimal number"),
        other => panic!("not a decimal value: {other}"),
    }
}
