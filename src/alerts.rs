use async_trait::async_trait;
use thiserror::Error;

/// Why an alert could not be delivered
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    #[error("cannot reach notification endpoint: {0}")]
    Unreachable(String),

    #[error("notification request timed out")]
    Timeout,

    #[error("invalid notification endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("notification rejected ({code}): {message}")]
    Rejected { code: i64, message: String },
}

/// Delivers a single textual alert to a remote notification endpoint
#[async_trait]
pub trait AlertSender: Send + Sync {
    async fn send(&self, endpoint: &str, text: &str) -> Result<(), SendError>;

    /// Send a fixed test message to check the endpoint
    async fn test_connection(&self, endpoint: &str) -> bool {
        self.send(endpoint, CONNECTION_TEST_MESSAGE).await.is_ok()
    }
}

pub const CONNECTION_TEST_MESSAGE: &str = "AList storage monitor connection test";
