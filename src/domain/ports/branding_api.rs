use crate::domain::entities::{EmailBranding, LetterBranding};
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

/// Branding and inbound number lookups.
#[async_trait]
pub trait BrandingApi: Send + Sync {
    async fn get_email_branding(&self, branding_id: &str) -> ClientResult<EmailBranding>;
    async fn get_letter_branding(&self, branding_id: &str) -> ClientResult<LetterBranding>;
    /// Empty string when the service has no inbound number.
    async fn get_inbound_number_for_service(&self, service_id: &str) -> ClientResult<String>;
}
