use crate::domain::errors::ClientResult;
use async_trait::async_trait;

/// Library of ready-made templates a service can start from.
#[async_trait]
pub trait TemplatePrefillApi: Send + Sync {
    async fn get_template(&self, template_id: &str) -> ClientResult<serde_json::Value>;
}
