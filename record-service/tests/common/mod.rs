#![allow(dead_code)]

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use mongodb::bson::oid::ObjectId;
use record_service::config::RecordConfig;
use record_service::models::Record;
use record_service::services::{MongoDb, RecordStore};
use record_service::startup::{build_router, AppState, Application};
use serde_json::Value;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tower::ServiceExt;
use uuid::Uuid;

/// Keeps records in memory and assigns ObjectId-style identifiers.
#[derive(Default)]
pub struct InMemoryStore {
    records: Mutex<Vec<Record>>,
}

impl InMemoryStore {
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordStore for InMemoryStore {
    async fn insert(&self, mut record: Record) -> Result<String, AppError> {
        let id = ObjectId::new().to_hex();
        record.insert("_id".to_string(), Value::String(id.clone()));
        self.records.lock().unwrap().push(record);
        Ok(id)
    }

    async fn list(&self) -> Result<Vec<Record>, AppError> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Behaves like a store whose server has gone away.
pub struct UnreachableStore;

#[async_trait]
impl RecordStore for UnreachableStore {
    async fn insert(&self, _record: Record) -> Result<String, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }

    async fn list(&self) -> Result<Vec<Record>, AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Err(AppError::DatabaseError(anyhow::anyhow!(
            "Server selection timeout: No available servers"
        )))
    }
}

pub fn router_with(store: Arc<dyn RecordStore>) -> Router {
    build_router(AppState::new(store))
}

/// Sends one request through the router and returns status and parsed body
/// (`Value::Null` for non-JSON bodies).
pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// A running service against a live MongoDB at `mongodb://localhost:27017`.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
    server: JoinHandle<()>,
}

impl TestApp {
    pub fn config(db_name: &str) -> RecordConfig {
        let mut config = RecordConfig::from_lookup(CoreConfig::default(), |key| match key {
            "MONGODB_URI" => Some("mongodb://localhost:27017".to_string()),
            "MONGODB_SERVER_SELECTION_TIMEOUT_SECS" => Some("3".to_string()),
            _ => None,
        })
        .expect("Failed to load configuration");
        config.common.port = 0; // Random port for testing
        config.mongodb.database = db_name.to_string();
        config
    }

    pub async fn spawn() -> Self {
        let db_name = format!("record_test_{}", Uuid::new_v4());
        Self::spawn_on(db_name).await
    }

    /// Starts a fresh process-equivalent on an existing database.
    pub async fn spawn_on(db_name: String) -> Self {
        let app = Application::build(Self::config(&db_name))
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let db = app.db().clone();
        let address = format!("http://127.0.0.1:{}", port);

        let server = tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for HTTP server to be ready by polling health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            db,
            db_name,
            server,
        }
    }

    /// Stops the server and drops its MongoDB client, leaving the data in
    /// place. Returns the database name so a new instance can reopen it.
    pub async fn stop(self) -> String {
        let TestApp {
            db_name,
            db,
            server,
            ..
        } = self;

        server.abort();
        let _ = server.await;
        drop(db);

        db_name
    }

    pub async fn cleanup(&self) {
        let _ = self.db.client().database(&self.db_name).drop(None).await;
    }
}
