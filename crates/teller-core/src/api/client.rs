use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::types::{RecommendationResponse, UserIdRequest};
use super::{ApiError, AskRequest, AskResponse, AssistantBackend};
use crate::config::Config;

const AGENT_RESPONSE_PATH: &str = "/api/agent/agent_response";
const RECOMMENDATION_PATH: &str = "/api/agent/get_recommendation";

#[derive(Clone)]
pub struct AssistantClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl AssistantClient {
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.api_base_url(), config.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "posting to assistant backend");

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .map_err(|e| self.classify(e, &url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%url, %status, "assistant backend returned an error status");
            return Err(ApiError::Status { status, body });
        }

        response.json::<T>().await.map_err(|e| self.classify(e, &url))
    }

    fn classify(&self, err: reqwest::Error, url: &str) -> ApiError {
        if err.is_timeout() {
            ApiError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }
        } else if err.is_decode() {
            ApiError::Decode(err)
        } else {
            ApiError::Transport(err)
        }
    }
}

#[async_trait]
impl AssistantBackend for AssistantClient {
    async fn ask(&self, request: AskRequest) -> Result<AskResponse, ApiError> {
        self.post_json(AGENT_RESPONSE_PATH, &request).await
    }

    async fn recommendations(&self, user_id: &str) -> Result<Vec<String>, ApiError> {
        let response: RecommendationResponse = self
            .post_json(RECOMMENDATION_PATH, &UserIdRequest { user_id })
            .await?;

        if response.success == Some(false) {
            debug!("backend reported no recommendations");
            return Ok(Vec::new());
        }
        Ok(response.recommendations)
    }
}
