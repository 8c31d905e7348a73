use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::authentication::create_jwt_token;
use crate::domain::errors::{ApiClientError, ApiErrorMessage, ClientResult};

const USER_AGENT: &str = concat!("notify-admin/", env!("CARGO_PKG_VERSION"));

/// Authenticated JSON client for the notification API.
#[derive(Clone)]
pub struct NotifyClient {
    http: Client,
    base_url: String,
    client_id: String,
    secret: String,
}

impl NotifyClient {
    pub fn new(base_url: &str, client_id: &str, secret: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            client_id: client_id.to_string(),
            secret: secret.to_string(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let token = create_jwt_token(&self.secret, &self.client_id, chrono::Utc::now().timestamp());
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::AUTHORIZATION, format!("Bearer {}", token))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
    }

    pub async fn get(&self, path: &str) -> ClientResult<Value> {
        send(Method::GET, path, self.request(Method::GET, path)).await
    }

    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> ClientResult<Value> {
        send(Method::GET, path, self.request(Method::GET, path).query(query)).await
    }

    pub async fn post(&self, path: &str, body: &Value) -> ClientResult<Value> {
        send(Method::POST, path, self.request(Method::POST, path).json(body)).await
    }

    pub async fn delete(&self, path: &str) -> ClientResult<Value> {
        send(Method::DELETE, path, self.request(Method::DELETE, path)).await
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

/// Sends the request and decodes a JSON body. An empty body is `null`.
pub(crate) async fn send(method: Method, path: &str, request: RequestBuilder) -> ClientResult<Value> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!("{} {} failed: {}", method, path, e);
        metrics::counter!("notify_api_requests_total", "method" => method.to_string(), "status" => "error")
            .increment(1);
        ApiClientError::Transport(e.to_string())
    })?;

    let status = response.status().as_u16();
    metrics::counter!(
        "notify_api_requests_total",
        "method" => method.to_string(),
        "status" => status_class(status)
    )
    .increment(1);

    let body = response
        .text()
        .await
        .map_err(|e| ApiClientError::Transport(e.to_string()))?;
    let json: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&body).unwrap_or(Value::String(body))
    };

    if (200..300).contains(&status) {
        tracing::debug!("{} {} returned {}", method, path, status);
        return Ok(json);
    }

    let message = match &json {
        Value::Object(map) => map
            .get("message")
            .map(ApiErrorMessage::from_json)
            .unwrap_or_else(|| ApiErrorMessage::Text(json.to_string())),
        other => ApiErrorMessage::from_json(other),
    };
    tracing::info!("{} {} returned {}: {}", method, path, status, message);
    Err(ApiClientError::Http { status, message })
}

/// Decodes `value[key]`, e.g. the `data` envelope most endpoints use.
pub fn field<T: DeserializeOwned>(mut value: Value, key: &str) -> ClientResult<T> {
    let inner = value
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ApiClientError::Decode(format!("Response has no '{}' field", key)))?;
    decode(inner)
}

pub fn decode<T: DeserializeOwned>(value: Value) -> ClientResult<T> {
    serde_json::from_value(value).map_err(|e| ApiClientError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_field_unwraps_envelope() {
        let names: Vec<String> = field(json!({ "data": ["a", "b"] }), "data").unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_missing_field_is_decode_error() {
        let result: ClientResult<Vec<String>> = field(json!({ "result": [] }), "data");
        assert!(matches!(result, Err(ApiClientError::Decode(_))));
    }

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(204), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
    }
}
