//! Request and response bodies of the operator API

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{NotificationRecord, StorageRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub storage: StoreHealth,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreHealth {
    pub healthy: bool,
    pub message: String,
    pub metadata: HashMap<String, String>,
}

/// Outcome of an action endpoint (start, stop, connection tests)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
}

impl ActionResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StoragesResponse {
    pub storages: Vec<StorageRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct NotificationsResponse {
    pub notifications: Vec<NotificationRecord>,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InventoryTestRequest {
    #[serde(default)]
    pub alist_url: String,
    #[serde(default)]
    pub alist_token: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookTestRequest {
    #[serde(default)]
    pub webhook_url: String,
}
