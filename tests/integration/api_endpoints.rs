//! Integration tests for API endpoints
//!
//! These tests verify that:
//! - All REST endpoints return correct responses
//! - Authentication middleware protects everything but health
//! - Config and scheduler errors map to the right status codes

use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{Value, json};
use storage_monitoring::{
    actors::Scheduler,
    api::{ApiState, spawn_api_server},
    config::ApiSettings,
    inventory::FetchError,
    monitors::MonitorCycle,
    storage::{MemoryStore, StateStore},
};

use crate::helpers::*;

const API_TOKEN: &str = "test-token";

struct TestApi {
    addr: SocketAddr,
    store: Arc<MemoryStore>,
    scheduler: Scheduler,
    inventory: Arc<FakeInventory>,
    sender: Arc<FakeSender>,
    client: reqwest::Client,
}

impl TestApi {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(API_TOKEN)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(API_TOKEN)
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

async fn spawn_test_api(
    inventory: FakeInventory,
    sender: FakeSender,
) -> TestApi {
    let store = Arc::new(MemoryStore::new());
    let inventory = Arc::new(inventory);
    let sender = Arc::new(sender);
    let scheduler = Scheduler::new(MonitorCycle::new(
        store.clone(),
        inventory.clone(),
        sender.clone(),
    ));

    let settings = ApiSettings {
        bind: "127.0.0.1:0".parse().unwrap(),
        token: Some(API_TOKEN.to_string()),
        enable_cors: true,
    };
    let state = ApiState::new(scheduler.clone(), inventory.clone(), sender.clone());
    let addr = spawn_api_server(&settings, state).await.unwrap();

    TestApi {
        addr,
        store,
        scheduler,
        inventory,
        sender,
        client: reqwest::Client::new(),
    }
}

async fn default_api() -> TestApi {
    spawn_test_api(
        FakeInventory::new(Ok(vec![
            create_entry(1, "Local", "/data", "work"),
            create_entry(2, "OneDrive", "/od", "error"),
        ])),
        FakeSender::default(),
    )
    .await
}

fn config_json(active: bool) -> Value {
    json!({
        "alist_url": "http://alist.local",
        "alist_token": "secret",
        "webhook_url": "http://hook.local",
        "interval": 5,
        "active": active
    })
}

#[tokio::test]
async fn test_health_endpoint_needs_no_token() {
    let api = default_api().await;

    let response = api
        .client
        .get(api.url("/api/v1/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"]["healthy"], true);
    assert!(json["timestamp"].is_string());
}

#[tokio::test]
async fn test_protected_endpoint_requires_token() {
    let api = default_api().await;

    let missing = api
        .client
        .get(api.url("/api/v1/storages"))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

    let wrong = api
        .client
        .get(api.url("/api/v1/storages"))
        .bearer_auth("wrong")
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_config_round_trip() {
    let api = default_api().await;

    let empty: Value = api.get("/api/v1/config").await.json().await.unwrap();
    assert!(empty.is_null());

    let saved = api.post("/api/v1/config", config_json(false)).await;
    assert_eq!(saved.status(), StatusCode::OK);

    let stored: Value = api.get("/api/v1/config").await.json().await.unwrap();
    assert_eq!(stored["alist_url"], "http://alist.local");
    assert_eq!(stored["interval"], 5);
    assert_eq!(stored["active"], false);
}

#[tokio::test]
async fn test_invalid_config_body_is_rejected() {
    let api = default_api().await;

    let response = api
        .post("/api/v1/config", json!({ "alist_url": "http://alist.local" }))
        .await;

    assert!(response.status().is_client_error());
    assert!(api.store.get_config().await.unwrap().is_none());
}

#[tokio::test]
async fn test_start_without_config_is_bad_request() {
    let api = default_api().await;

    let response = api.post("/api/v1/monitor/start", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json: Value = response.json().await.unwrap();
    assert!(json["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn test_start_inactive_config_is_bad_request() {
    let api = default_api().await;
    api.post("/api/v1/config", config_json(false)).await;

    let response = api.post("/api/v1/monitor/start", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(!api.scheduler.is_active().await);
}

#[tokio::test]
async fn test_start_status_stop() {
    let api = default_api().await;
    api.post("/api/v1/config", config_json(true)).await;

    let started = api.post("/api/v1/monitor/start", json!({})).await;
    assert_eq!(started.status(), StatusCode::OK);

    let status: Value = api.get("/api/v1/monitor/status").await.json().await.unwrap();
    assert_eq!(status["active"], true);
    assert!(status["next_check"].is_string());

    let stopped = api.post("/api/v1/monitor/stop", json!({})).await;
    assert_eq!(stopped.status(), StatusCode::OK);

    let status: Value = api.get("/api/v1/monitor/status").await.json().await.unwrap();
    assert_eq!(status["active"], false);
    assert!(status["next_check"].is_null());

    // stopping twice is fine
    let again = api.post("/api/v1/monitor/stop", json!({})).await;
    assert_eq!(again.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_manual_check_updates_storages_and_notifications() {
    let api = default_api().await;
    api.post("/api/v1/config", config_json(false)).await;

    let response = api.post("/api/v1/monitor/check", json!({})).await;
    assert_eq!(response.status(), StatusCode::OK);
    let report: Value = response.json().await.unwrap();
    assert_eq!(report["storages_observed"], 2);
    assert_eq!(report["notifications"].as_array().unwrap().len(), 1);

    let storages: Value = api.get("/api/v1/storages").await.json().await.unwrap();
    assert_eq!(storages["count"], 2);

    let notifications: Value = api.get("/api/v1/notifications").await.json().await.unwrap();
    assert_eq!(notifications["count"], 1);
    assert_eq!(notifications["notifications"][0]["kind"], "error");
    assert_eq!(notifications["notifications"][0]["delivery_state"], "sent");

    let status: Value = api.get("/api/v1/monitor/status").await.json().await.unwrap();
    assert_eq!(status["total_storages"], 2);
    assert_eq!(status["working_storages"], 1);
    assert!(status["last_check"].is_string());

    assert_eq!(api.inventory.calls(), 1);
    assert_eq!(api.sender.sent().len(), 1);
}

#[tokio::test]
async fn test_manual_check_without_config_is_bad_request() {
    let api = default_api().await;

    let response = api.post("/api/v1/monitor/check", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(api.inventory.calls(), 0);
}

#[tokio::test]
async fn test_inventory_connection_test() {
    let api = default_api().await;

    let ok = api
        .post(
            "/api/v1/test/inventory",
            json!({ "alist_url": "http://alist.local", "alist_token": "secret" }),
        )
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    let json: Value = ok.json().await.unwrap();
    assert_eq!(json["success"], true);

    let missing = api
        .post("/api/v1/test/inventory", json!({ "alist_url": "http://alist.local" }))
        .await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_inventory_connection_test_failure() {
    let api = spawn_test_api(
        FakeInventory::new(Err(FetchError::Unauthorized)),
        FakeSender::default(),
    )
    .await;

    let response = api
        .post(
            "/api/v1/test/inventory",
            json!({ "alist_url": "http://alist.local", "alist_token": "expired" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_connection_test() {
    let api = default_api().await;

    let ok = api
        .post("/api/v1/test/webhook", json!({ "webhook_url": "http://hook.local" }))
        .await;
    assert_eq!(ok.status(), StatusCode::OK);
    assert_eq!(api.sender.sent().len(), 1);

    let missing = api.post("/api/v1/test/webhook", json!({})).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_connection_test_failure() {
    let api = spawn_test_api(FakeInventory::new(Ok(vec![])), FakeSender::failing()).await;

    let response = api
        .post("/api/v1/test/webhook", json!({ "webhook_url": "http://hook.local" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
