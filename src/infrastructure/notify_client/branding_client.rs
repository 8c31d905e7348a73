use async_trait::async_trait;
use serde_json::Value;

use super::base_client::{decode, field, NotifyClient};
use crate::domain::entities::{EmailBranding, LetterBranding};
use crate::domain::errors::ClientResult;
use crate::domain::ports::BrandingApi;

#[derive(Clone)]
pub struct BrandingClient {
    client: NotifyClient,
}

impl BrandingClient {
    pub fn new(client: NotifyClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BrandingApi for BrandingClient {
    async fn get_email_branding(&self, branding_id: &str) -> ClientResult<EmailBranding> {
        let response = self
            .client
            .get(&format!("/email-branding/{}", branding_id))
            .await?;
        field(response, "email_branding")
    }

    async fn get_letter_branding(&self, branding_id: &str) -> ClientResult<LetterBranding> {
        decode(
            self.client
                .get(&format!("/letter-branding/{}", branding_id))
                .await?,
        )
    }

    async fn get_inbound_number_for_service(&self, service_id: &str) -> ClientResult<String> {
        let response = self
            .client
            .get(&format!("/inbound-number/service/{}", service_id))
            .await?;
        Ok(response
            .get("data")
            .and_then(|data| data.get("number"))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
