//! Inventory client - fetches the storage list from an AList server
//!
//! The monitor only depends on the [`InventoryClient`] trait. [`AlistClient`]
//! is the HTTP implementation used in production:
//!
//! ```text
//! GET {base_url}/api/admin/storage/list
//! Authorization: Bearer {token}
//!
//! {"code": 200, "message": "success", "data": {"content": [...], "total": 2}}
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, trace};

use crate::config::InventoryTarget;
use crate::{InventoryEntry, StorageStatus};

const STORAGE_LIST_PATH: &str = "/api/admin/storage/list";

/// Why the inventory could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("cannot reach inventory server: {0}")]
    Unreachable(String),

    #[error("inventory request timed out")]
    Timeout,

    #[error("inventory token is invalid or expired")]
    Unauthorized,

    #[error("inventory access denied, check token permissions")]
    Forbidden,

    #[error("inventory API error ({code}): {message}")]
    Api { code: i64, message: String },

    #[error("malformed inventory response: {0}")]
    Malformed(String),
}

/// Source of the current storage inventory
#[async_trait]
pub trait InventoryClient: Send + Sync {
    async fn fetch(&self, target: &InventoryTarget) -> Result<Vec<InventoryEntry>, FetchError>;

    /// Check that the target is reachable with the given credential
    async fn test_connection(&self, target: &InventoryTarget) -> bool {
        self.fetch(target).await.is_ok()
    }
}

/// Response envelope used by every AList admin endpoint
#[derive(Debug, Deserialize)]
struct AlistResponse {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<AlistData>,
}

/// Storage list payload; older servers return a bare array
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AlistData {
    Page { content: Option<Vec<AlistStorage>> },
    List(Vec<AlistStorage>),
}

#[derive(Debug, Deserialize)]
struct AlistStorage {
    id: u64,
    #[serde(default)]
    mount_path: String,
    #[serde(default)]
    driver: String,
    #[serde(default)]
    status: String,
}

impl From<AlistStorage> for InventoryEntry {
    fn from(storage: AlistStorage) -> Self {
        InventoryEntry {
            id: storage.id,
            driver: storage.driver,
            mount_path: storage.mount_path,
            status: StorageStatus::from(storage.status),
        }
    }
}

/// Decode a storage list body into inventory entries
fn parse_storage_list(body: &str) -> Result<Vec<InventoryEntry>, FetchError> {
    let response: AlistResponse =
        serde_json::from_str(body).map_err(|e| FetchError::Malformed(e.to_string()))?;

    match response.code {
        200 => {}
        401 => return Err(FetchError::Unauthorized),
        403 => return Err(FetchError::Forbidden),
        code => {
            return Err(FetchError::Api {
                code,
                message: response.message,
            });
        }
    }

    let storages = match response.data {
        Some(AlistData::Page { content }) => content.unwrap_or_default(),
        Some(AlistData::List(storages)) => storages,
        None => Vec::new(),
    };

    Ok(storages.into_iter().map(InventoryEntry::from).collect())
}

/// Inventory client talking to the AList admin API
#[derive(Debug, Clone)]
pub struct AlistClient {
    client: reqwest::Client,
}

impl AlistClient {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().timeout(timeout).build()?,
        })
    }

    fn list_url(base_url: &str) -> String {
        format!("{}{STORAGE_LIST_PATH}", base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl InventoryClient for AlistClient {
    #[instrument(skip(self, target), fields(base_url = %target.base_url))]
    async fn fetch(&self, target: &InventoryTarget) -> Result<Vec<InventoryEntry>, FetchError> {
        let url = Self::list_url(&target.base_url);
        trace!("requesting storage list from {url}");

        let response = self
            .client
            .get(&url)
            .bearer_auth(&target.token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Timeout
                } else {
                    FetchError::Unreachable(e.to_string())
                }
            })?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(FetchError::Unauthorized),
            StatusCode::FORBIDDEN => return Err(FetchError::Forbidden),
            status if !status.is_success() => {
                return Err(FetchError::Api {
                    code: i64::from(status.as_u16()),
                    message: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }
            _ => {}
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Malformed(e.to_string())
            }
        })?;

        let entries = parse_storage_list(&body)?;
        debug!("fetched {} storages", entries.len());
        Ok(entries)
    }
}

/// Client that answers demo tokens with a fixed inventory
///
/// Any token containing `demo` gets four sample storages (two working, one
/// failing, one disabled) and always passes the connection test. Other
/// tokens go to the wrapped client.
pub struct DemoInventory {
    inner: Arc<dyn InventoryClient>,
}

impl DemoInventory {
    pub fn new(inner: Arc<dyn InventoryClient>) -> Self {
        Self { inner }
    }

    pub fn is_demo_token(token: &str) -> bool {
        token.contains("demo")
    }
}

fn demo_storages() -> Vec<InventoryEntry> {
    [
        (1, "AliyunDrive", "/aliyun", StorageStatus::Work),
        (2, "Local", "/local", StorageStatus::Work),
        (3, "OneDrive", "/onedrive", StorageStatus::Error),
        (4, "BaiduNetdisk", "/baidu", StorageStatus::Disabled),
    ]
    .into_iter()
    .map(|(id, driver, mount_path, status)| InventoryEntry {
        id,
        driver: driver.to_string(),
        mount_path: mount_path.to_string(),
        status,
    })
    .collect()
}

#[async_trait]
impl InventoryClient for DemoInventory {
    async fn fetch(&self, target: &InventoryTarget) -> Result<Vec<InventoryEntry>, FetchError> {
        if Self::is_demo_token(&target.token) {
            debug!("serving demo inventory");
            return Ok(demo_storages());
        }
        self.inner.fetch(target).await
    }

    async fn test_connection(&self, target: &InventoryTarget) -> bool {
        Self::is_demo_token(&target.token) || self.inner.test_connection(target).await
    }
}
