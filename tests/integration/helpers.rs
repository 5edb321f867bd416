//! Helper functions and fakes for integration tests

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use storage_monitoring::{
    InventoryEntry, StorageStatus,
    alerts::{AlertSender, SendError},
    config::{InventoryTarget, MonitorConfig},
    inventory::{FetchError, InventoryClient},
};
use tokio::sync::Semaphore;

pub const TEST_TOKEN: &str = "alist-admin-token";

pub fn create_monitor_config(alist_url: &str, webhook_url: &str) -> MonitorConfig {
    MonitorConfig {
        alist_url: alist_url.to_string(),
        alist_token: TEST_TOKEN.to_string(),
        webhook_url: webhook_url.to_string(),
        interval: 1,
        active: true,
    }
}

pub fn create_entry(id: u64, driver: &str, mount_path: &str, status: &str) -> InventoryEntry {
    InventoryEntry {
        id,
        driver: driver.to_string(),
        mount_path: mount_path.to_string(),
        status: StorageStatus::from(status),
    }
}

/// AList storage list envelope for `(id, driver, mount_path, status)` rows
pub fn create_storage_list_json(rows: &[(u64, &str, &str, &str)]) -> serde_json::Value {
    let content: Vec<_> = rows
        .iter()
        .map(|(id, driver, mount_path, status)| {
            serde_json::json!({
                "id": id,
                "mount_path": mount_path,
                "driver": driver,
                "status": status,
                "remark": "",
                "disabled": *status == "disabled",
            })
        })
        .collect();

    serde_json::json!({
        "code": 200,
        "message": "success",
        "data": { "content": content, "total": rows.len() }
    })
}

pub fn create_webhook_response(errcode: i64, errmsg: &str) -> serde_json::Value {
    serde_json::json!({ "errcode": errcode, "errmsg": errmsg })
}

/// Inventory returning a fixed result
///
/// In blocking mode every fetch waits for a permit released by the test.
pub struct FakeInventory {
    result: Mutex<Result<Vec<InventoryEntry>, FetchError>>,
    permits: Option<Semaphore>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeInventory {
    pub fn new(result: Result<Vec<InventoryEntry>, FetchError>) -> Self {
        Self {
            result: Mutex::new(result),
            permits: None,
            delay: None,
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn blocking(result: Result<Vec<InventoryEntry>, FetchError>) -> Self {
        Self {
            permits: Some(Semaphore::new(0)),
            ..Self::new(result)
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_result(&self, result: Result<Vec<InventoryEntry>, FetchError>) {
        *self.result.lock().unwrap() = result;
    }

    pub fn release(&self, n: usize) {
        if let Some(permits) = &self.permits {
            permits.add_permits(n);
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InventoryClient for FakeInventory {
    async fn fetch(&self, _: &InventoryTarget) -> Result<Vec<InventoryEntry>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(permits) = &self.permits {
            permits.acquire().await.unwrap().forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.result.lock().unwrap().clone()
    }
}

/// Sender recording every delivered text
#[derive(Default)]
pub struct FakeSender {
    fail: AtomicBool,
    sent: Mutex<Vec<String>>,
}

impl FakeSender {
    pub fn failing() -> Self {
        Self {
            fail: AtomicBool::new(true),
            ..Default::default()
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSender for FakeSender {
    async fn send(&self, _: &str, text: &str) -> Result<(), SendError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail.load(Ordering::SeqCst) {
            Err(SendError::Rejected {
                code: 93000,
                message: "invalid webhook url".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Let spawned tasks run without moving the clock
pub async fn settle() {
    for _ in 0..50 {
        tokio::task::yield_now().await;
    }
}
