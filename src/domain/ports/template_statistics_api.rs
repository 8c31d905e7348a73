use crate::domain::entities::TemplateLastUsed;
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

#[async_trait]
pub trait TemplateStatisticsApi: Send + Sync {
    /// `Ok(None)` when nothing was sent from the template within the
    /// retention window. A template that was never used answers 404.
    async fn get_template_statistics_for_template(
        &self,
        service_id: &str,
        template_id: &str,
    ) -> ClientResult<Option<TemplateLastUsed>>;
}
