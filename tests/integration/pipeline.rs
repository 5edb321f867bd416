//! End-to-end cycles against mocked AList and WeChat servers
//!
//! These tests wire the production HTTP clients into a real `MonitorCycle`
//! and `Scheduler`:
//! - Healthy inventories produce no webhook traffic
//! - Unhealthy entries are delivered and recorded
//! - Delivery and fetch failures end up in the notification log

use std::sync::Arc;
use std::time::Duration;

use storage_monitoring::{
    DeliveryState, NotificationKind, StorageStatus,
    actors::Scheduler,
    inventory::AlistClient,
    monitors::MonitorCycle,
    storage::{MemoryStore, StateStore},
    wechat::WeChatSender,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::helpers::*;

const LIST_PATH: &str = "/api/admin/storage/list";
const HOOK_PATH: &str = "/cgi-bin/webhook/send";

fn production_cycle(store: Arc<MemoryStore>) -> MonitorCycle {
    let timeout = Duration::from_secs(5);
    MonitorCycle::new(
        store,
        Arc::new(AlistClient::new(timeout).unwrap()),
        Arc::new(WeChatSender::new(timeout).unwrap()),
    )
}

async fn mount_inventory(server: &MockServer, rows: &[(u64, &str, &str, &str)]) {
    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .and(header("Authorization", format!("Bearer {TEST_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_storage_list_json(rows)))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_working_storage_sends_nothing() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    mount_inventory(&alist, &[(1, "Local", "/data", "work")]).await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .expect(0)
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));

    let report = cycle.run(&config).await.unwrap();

    assert!(report.notifications.is_empty());
    let storages = store.list_storages().await.unwrap();
    assert_eq!(storages.len(), 1);
    assert_eq!(storages[0].status, StorageStatus::Work);
    assert_eq!(storages[0].driver, "Local");
    assert!(store.list_notifications().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_error_storage_is_delivered() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    mount_inventory(
        &alist,
        &[
            (1, "Local", "/data", "work"),
            (2, "OneDrive", "/od", "error"),
        ],
    )
    .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .and(body_partial_json(serde_json::json!({"msgtype": "text"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .expect(1)
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));

    let report = cycle.run(&config).await.unwrap();

    assert_eq!(report.sent(), 1);
    let notifications = store.list_notifications().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(notifications[0].delivery_state, DeliveryState::Sent);
    assert!(notifications[0].message.contains("Mount path: /od"));

    let requests = wechat.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    let content = body["text"]["content"].as_str().unwrap();
    assert!(content.starts_with("🚨 Storage status alert"));
    assert!(content.contains("Driver: OneDrive"));
}

#[tokio::test]
async fn test_rejected_delivery_is_recorded_as_failed() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    mount_inventory(&alist, &[(2, "OneDrive", "/od", "error")]).await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(create_webhook_response(93000, "invalid webhook url")),
        )
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));

    let report = cycle.run(&config).await.unwrap();

    assert_eq!(report.failed(), 1);
    let notifications = store.list_notifications().await.unwrap();
    assert_eq!(notifications[0].delivery_state, DeliveryState::Failed);
    assert_eq!(notifications[0].kind, NotificationKind::Error);
}

#[tokio::test]
async fn test_unreachable_inventory_is_reported() {
    let wechat = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .expect(1)
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config("http://127.0.0.1:1", &format!("{}{HOOK_PATH}", wechat.uri()));

    let report = cycle.run(&config).await.unwrap();

    assert!(!report.inventory_available);
    assert!(store.list_storages().await.unwrap().is_empty());

    let notifications = store.list_notifications().await.unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].title, "Storage check failed");
    assert_eq!(notifications[0].kind, NotificationKind::Error);
    assert_eq!(notifications[0].delivery_state, DeliveryState::Sent);
}

#[tokio::test]
async fn test_expired_token_is_reported() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(401))
        .mount(&alist)
        .await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));

    cycle.run(&config).await.unwrap();

    let notifications = store.list_notifications().await.unwrap();
    assert!(notifications[0].message.contains("token is invalid or expired"));
}

#[tokio::test]
async fn test_status_changes_overwrite_records() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_storage_list_json(&[(
            2, "OneDrive", "/od", "work",
        )])))
        .up_to_n_times(1)
        .mount(&alist)
        .await;
    mount_inventory(&alist, &[(2, "OneDrive", "/od", "network timeout")]).await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let cycle = production_cycle(store.clone());
    let config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));

    let first = cycle.run(&config).await.unwrap();
    let second = cycle.run(&config).await.unwrap();

    assert!(first.notifications.is_empty());
    assert_eq!(second.notifications.len(), 1);
    assert_eq!(second.notifications[0].kind, NotificationKind::Warning);

    let storages = store.list_storages().await.unwrap();
    assert_eq!(storages.len(), 1);
    assert_eq!(
        storages[0].status,
        StorageStatus::Other("network timeout".to_string())
    );
    assert_eq!(storages[0].last_check, second.observed_at);
}

#[tokio::test]
async fn test_manual_check_through_scheduler() {
    let alist = MockServer::start().await;
    let wechat = MockServer::start().await;

    mount_inventory(&alist, &[(2, "OneDrive", "/od", "error")]).await;
    Mock::given(method("POST"))
        .and(path(HOOK_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(create_webhook_response(0, "ok")))
        .mount(&wechat)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut config = create_monitor_config(&alist.uri(), &format!("{}{HOOK_PATH}", wechat.uri()));
    config.active = false;
    store.save_config(config).await.unwrap();

    let scheduler = Scheduler::new(production_cycle(store.clone()));
    let report = scheduler.trigger_once().await.unwrap();

    assert_eq!(report.sent(), 1);
    assert!(!scheduler.is_active().await);

    let overview = scheduler.overview().await.unwrap();
    assert_eq!(overview.total_storages, 1);
    assert_eq!(overview.working_storages, 0);
}
