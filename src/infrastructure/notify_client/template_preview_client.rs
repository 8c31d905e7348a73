use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

use crate::domain::entities::Template;
use crate::domain::errors::{ApiClientError, ApiErrorMessage, ClientResult};
use crate::domain::ports::{PreviewFileType, RenderedPreview, TemplatePreviewApi};

/// Renders letters through the template preview service.
#[derive(Clone)]
pub struct TemplatePreviewClient {
    http: Client,
    host: String,
    api_key: String,
}

impl TemplatePreviewClient {
    pub fn new(host: &str, api_key: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiClientError::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            host: host.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn post(&self, path: &str, query: &[(&str, String)], body: &Value) -> ClientResult<reqwest::Response> {
        let response = self
            .http
            .post(format!("{}{}", self.host, path))
            .header(reqwest::header::AUTHORIZATION, format!("Token {}", self.api_key))
            .query(query)
            .json(body)
            .send()
            .await
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!("Template preview {} returned {}: {}", path, status, text);
            return Err(ApiClientError::Http {
                status,
                message: ApiErrorMessage::Text(text),
            });
        }
        Ok(response)
    }

    async fn rendered(&self, path: &str, query: &[(&str, String)], body: &Value) -> ClientResult<RenderedPreview> {
        let response = self.post(path, query, body).await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiClientError::Transport(e.to_string()))?;
        Ok(RenderedPreview {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

fn letter_body(template: &Template, branding_filename: Option<&str>) -> Value {
    json!({
        "letter_contact_block": template.reply_to_text,
        "template": template,
        "values": null,
        "filename": branding_filename,
    })
}

#[async_trait]
impl TemplatePreviewApi for TemplatePreviewClient {
    async fn render(
        &self,
        template: &Template,
        filetype: PreviewFileType,
        page: Option<u32>,
        branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview> {
        let query: Vec<(&str, String)> = page.map(|p| vec![("page", p.to_string())]).unwrap_or_default();
        self.rendered(
            &format!("/preview.{}", filetype.as_str()),
            &query,
            &letter_body(template, branding_filename),
        )
        .await
    }

    async fn page_count(&self, template: &Template) -> ClientResult<u32> {
        let response = self
            .post("/get-page-count", &[], &letter_body(template, None))
            .await?;
        let body: Value = response
            .json()
            .await
            .map_err(|e| ApiClientError::Decode(e.to_string()))?;
        body.get("count")
            .and_then(Value::as_u64)
            .map(|count| count as u32)
            .ok_or_else(|| ApiClientError::Decode("Page count response has no 'count'".to_string()))
    }

    async fn render_example(
        &self,
        subject: &str,
        content: &str,
        branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview> {
        let body = json!({
            "letter_contact_block": "",
            "template": { "subject": subject, "content": content },
            "values": null,
            "filename": branding_filename,
        });
        self.rendered("/preview.png", &[], &body).await
    }
}
