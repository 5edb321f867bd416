use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::alerts::{AlertSender, SendError};

#[derive(Debug, Clone, Serialize)]
pub struct MessageContent {
    pub content: String,
}

/// Payload accepted by a WeChat Work group robot webhook
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "msgtype", rename_all = "lowercase")]
pub enum Message {
    Text { text: MessageContent },
    Markdown { markdown: MessageContent },
}

impl Message {
    pub fn text(content: impl ToString) -> Self {
        Message::Text {
            text: MessageContent {
                content: content.to_string(),
            },
        }
    }

    pub fn markdown(content: impl ToString) -> Self {
        Message::Markdown {
            markdown: MessageContent {
                content: content.to_string(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebhookResponse {
    errcode: i64,
    #[serde(default)]
    errmsg: String,
}

/// Alert sender posting to a WeChat Work robot webhook
#[derive(Debug, Clone)]
pub struct WeChatSender {
    client: Client,
}

impl WeChatSender {
    pub fn new(timeout: Duration) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    #[instrument(skip(self, message))]
    pub async fn send_message(&self, webhook_url: &str, message: &Message) -> Result<(), SendError> {
        let url = reqwest::Url::parse(webhook_url)
            .map_err(|e| SendError::InvalidEndpoint(e.to_string()))?;

        let response = self
            .client
            .post(url)
            .json(message)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send WeChat message: {}", e);
                if e.is_timeout() {
                    SendError::Timeout
                } else {
                    SendError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST {
            error!("WeChat webhook rejected the request as invalid");
            return Err(SendError::InvalidEndpoint(webhook_url.to_string()));
        }
        if !status.is_success() {
            error!("WeChat message failed with status: {}", status);
            return Err(SendError::Rejected {
                code: i64::from(status.as_u16()),
                message: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body: WebhookResponse = response.json().await.map_err(|e| SendError::Rejected {
            code: -1,
            message: format!("unreadable webhook response: {e}"),
        })?;

        if body.errcode != 0 {
            error!("WeChat API error response: {}", body.errmsg);
            return Err(SendError::Rejected {
                code: body.errcode,
                message: body.errmsg,
            });
        }

        info!("Successfully sent WeChat message");
        Ok(())
    }

    pub async fn send_markdown(&self, webhook_url: &str, content: &str) -> Result<(), SendError> {
        self.send_message(webhook_url, &Message::markdown(content))
            .await
    }
}

#[async_trait]
impl AlertSender for WeChatSender {
    async fn send(&self, endpoint: &str, text: &str) -> Result<(), SendError> {
        self.send_message(endpoint, &Message::text(text)).await
    }
}
