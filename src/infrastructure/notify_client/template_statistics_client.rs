use async_trait::async_trait;

use super::base_client::{field, NotifyClient};
use crate::domain::entities::TemplateLastUsed;
use crate::domain::errors::ClientResult;
use crate::domain::ports::TemplateStatisticsApi;

#[derive(Clone)]
pub struct TemplateStatisticsClient {
    client: NotifyClient,
}

impl TemplateStatisticsClient {
    pub fn new(client: NotifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TemplateStatisticsApi for TemplateStatisticsClient {
    async fn get_template_statistics_for_template(
        &self,
        service_id: &str,
        template_id: &str,
    ) -> ClientResult<Option<TemplateLastUsed>> {
        let response = self
            .client
            .get(&format!("/service/{}/template-statistics/{}", service_id, template_id))
            .await?;
        field(response, "data")
    }
}
