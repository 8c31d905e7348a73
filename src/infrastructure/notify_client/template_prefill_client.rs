use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::domain::errors::{ApiClientError, ApiErrorMessage, ClientResult};
use crate::domain::ports::TemplatePrefillApi;

#[derive(Clone)]
pub struct TemplatePrefillClient {
    http: Client,
    host: String,
}

impl TemplatePrefillClient {
    pub fn new(host: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl TemplatePrefillApi for TemplatePrefillClient {
    async fn get_template(&self, template_id: &str) -> ClientResult<Value> {
        let response = self
            .http
            .get(format!("{}/template/{}", self.host, template_id))
            .send()
            .await
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Err(ApiClientError::Http {
                status,
                message: ApiErrorMessage::Text(format!("Prefill template {} unavailable", template_id)),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ApiClientError::Decode(e.to_string()))
    }
}
