pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use client::AssistantClient;
pub use types::{AskRequest, AskResponse, PaymentMetadata};

/// Why a backend call produced no usable answer
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("could not reach assistant backend: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("assistant backend returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("malformed response from assistant backend: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("request task ended abnormally: {0}")]
    Task(String),
}

/// The assistant backend as seen by a chat session.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, ApiError>;

    /// Suggested opening questions for a user
    async fn recommendations(&self, user_id: &str) -> Result<Vec<String>, ApiError>;
}
