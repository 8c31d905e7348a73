use crate::domain::entities::{
    DataRetention, EmailReplyToAddress, LetterContact, Postage, ServiceData, SmsSender, Template,
    TemplateDraftFields,
};
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

/// Service and template endpoints of the notification API.
///
/// Mutating calls take the id of the acting user; the API records it as
/// `created_by`.
#[async_trait]
pub trait ServiceApi: Send + Sync {
    async fn get_service(&self, service_id: &str) -> ClientResult<ServiceData>;
    async fn update_service(
        &self,
        service_id: &str,
        changes: serde_json::Map<String, serde_json::Value>,
        acting_user_id: &str,
    ) -> ClientResult<ServiceData>;

    async fn get_service_templates(&self, service_id: &str) -> ClientResult<Vec<Template>>;
    async fn get_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        version: Option<i64>,
    ) -> ClientResult<Template>;
    async fn get_service_template_versions(
        &self,
        service_id: &str,
        template_id: &str,
    ) -> ClientResult<Vec<Template>>;
    async fn create_service_template(
        &self,
        service_id: &str,
        fields: &TemplateDraftFields,
        parent_folder_id: Option<&str>,
        acting_user_id: &str,
    ) -> ClientResult<Template>;
    async fn update_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        fields: &TemplateDraftFields,
        acting_user_id: &str,
    ) -> ClientResult<Template>;
    /// Archives the template.
    async fn delete_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        acting_user_id: &str,
    ) -> ClientResult<()>;
    async fn redact_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        acting_user_id: &str,
    ) -> ClientResult<()>;
    async fn update_service_template_sender(
        &self,
        service_id: &str,
        template_id: &str,
        reply_to: Option<&str>,
        acting_user_id: &str,
    ) -> ClientResult<()>;
    async fn update_service_template_postage(
        &self,
        service_id: &str,
        template_id: &str,
        postage: Postage,
        acting_user_id: &str,
    ) -> ClientResult<()>;

    async fn get_reply_to_email_addresses(&self, service_id: &str) -> ClientResult<Vec<EmailReplyToAddress>>;
    async fn get_sms_senders(&self, service_id: &str) -> ClientResult<Vec<SmsSender>>;
    async fn get_letter_contacts(&self, service_id: &str) -> ClientResult<Vec<LetterContact>>;
    async fn update_letter_contact(
        &self,
        service_id: &str,
        letter_contact_id: &str,
        contact_block: &str,
        is_default: bool,
    ) -> ClientResult<()>;
    async fn get_service_data_retention(&self, service_id: &str) -> ClientResult<Vec<DataRetention>>;
}
