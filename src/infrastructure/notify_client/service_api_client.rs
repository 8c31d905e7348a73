use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{json, Map, Value};

use super::api_cache::{service_key, template_version_key, template_versions_key, templates_key, ApiCache};
use super::base_client::{decode, field, NotifyClient};
use crate::domain::entities::{
    DataRetention, EmailReplyToAddress, LetterContact, Postage, ServiceData, SmsSender, Template,
    TemplateDraftFields,
};
use crate::domain::errors::ClientResult;
use crate::domain::ports::ServiceApi;

/// Service and template endpoints, with reads cached in the API cache.
#[derive(Clone)]
pub struct ServiceApiClient {
    client: NotifyClient,
    cache: ApiCache,
}

impl ServiceApiClient {
    pub fn new(client: NotifyClient, cache: ApiCache) -> Self {
        Self { client, cache }
    }

    async fn invalidate_template(&self, service_id: &str, template_id: &str) {
        self.cache
            .invalidate(&[
                templates_key(service_id),
                template_version_key(template_id, None),
                template_versions_key(template_id),
            ])
            .await;
    }

    async fn update_template_fields(
        &self,
        service_id: &str,
        template_id: &str,
        mut body: Map<String, Value>,
        acting_user_id: &str,
    ) -> ClientResult<Value> {
        body.insert("created_by".to_string(), json!(acting_user_id));
        let response = self
            .client
            .post(
                &format!("/service/{}/template/{}", service_id, template_id),
                &Value::Object(body),
            )
            .await?;
        self.invalidate_template(service_id, template_id).await;
        Ok(response)
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> ClientResult<Vec<T>> {
        decode(self.client.get(path).await?)
    }
}

fn single(key: &str, value: Value) -> Map<String, Value> {
    let mut body = Map::new();
    body.insert(key.to_string(), value);
    body
}

#[async_trait]
impl ServiceApi for ServiceApiClient {
    async fn get_service(&self, service_id: &str) -> ClientResult<ServiceData> {
        self.cache.cached(&service_key(service_id), || async {
            field(self.client.get(&format!("/service/{}", service_id)).await?, "data")
        })
        .await
    }

    async fn update_service(
        &self,
        service_id: &str,
        mut changes: Map<String, Value>,
        acting_user_id: &str,
    ) -> ClientResult<ServiceData> {
        changes.insert("created_by".to_string(), json!(acting_user_id));
        let response = self
            .client
            .post(&format!("/service/{}", service_id), &Value::Object(changes))
            .await?;
        self.cache.invalidate(&[service_key(service_id)]).await;
        field(response, "data")
    }

    async fn get_service_templates(&self, service_id: &str) -> ClientResult<Vec<Template>> {
        self.cache.cached(&templates_key(service_id), || async {
            field(self.client.get(&format!("/service/{}/template", service_id)).await?, "data")
        })
        .await
    }

    async fn get_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        version: Option<i64>,
    ) -> ClientResult<Template> {
        let path = match version {
            Some(v) => format!("/service/{}/template/{}/version/{}", service_id, template_id, v),
            None => format!("/service/{}/template/{}", service_id, template_id),
        };
        self.cache.cached(&template_version_key(template_id, version), || async {
            field(self.client.get(&path).await?, "data")
        })
        .await
    }

    async fn get_service_template_versions(
        &self,
        service_id: &str,
        template_id: &str,
    ) -> ClientResult<Vec<Template>> {
        self.cache.cached(&template_versions_key(template_id), || async {
            field(
                self.client
                    .get(&format!("/service/{}/template/{}/versions", service_id, template_id))
                    .await?,
                "data",
            )
        })
        .await
    }

    async fn create_service_template(
        &self,
        service_id: &str,
        fields: &TemplateDraftFields,
        parent_folder_id: Option<&str>,
        acting_user_id: &str,
    ) -> ClientResult<Template> {
        let mut body = json!({
            "template_type": fields.template_type,
            "name": fields.name,
            "content": fields.content,
            "service": service_id,
            "process_type": fields.process_type,
            "created_by": acting_user_id,
        });
        if let Some(subject) = &fields.subject {
            body["subject"] = json!(subject);
        }
        if let Some(folder) = parent_folder_id {
            body["parent_folder_id"] = json!(folder);
        }
        let response = self
            .client
            .post(&format!("/service/{}/template", service_id), &body)
            .await?;
        self.cache.invalidate(&[templates_key(service_id)]).await;
        field(response, "data")
    }

    async fn update_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        fields: &TemplateDraftFields,
        acting_user_id: &str,
    ) -> ClientResult<Template> {
        let mut body = Map::new();
        body.insert("id".to_string(), json!(template_id));
        body.insert("name".to_string(), json!(fields.name));
        body.insert("template_type".to_string(), json!(fields.template_type));
        body.insert("content".to_string(), json!(fields.content));
        body.insert("service".to_string(), json!(service_id));
        body.insert("process_type".to_string(), json!(fields.process_type));
        if let Some(subject) = &fields.subject {
            body.insert("subject".to_string(), json!(subject));
        }
        let response = self
            .update_template_fields(service_id, template_id, body, acting_user_id)
            .await?;
        field(response, "data")
    }

    async fn delete_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        acting_user_id: &str,
    ) -> ClientResult<()> {
        self.update_template_fields(service_id, template_id, single("archived", json!(true)), acting_user_id)
            .await?;
        Ok(())
    }

    async fn redact_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        acting_user_id: &str,
    ) -> ClientResult<()> {
        self.update_template_fields(
            service_id,
            template_id,
            single("redact_personalisation", json!(true)),
            acting_user_id,
        )
        .await?;
        Ok(())
    }

    async fn update_service_template_sender(
        &self,
        service_id: &str,
        template_id: &str,
        reply_to: Option<&str>,
        acting_user_id: &str,
    ) -> ClientResult<()> {
        self.update_template_fields(service_id, template_id, single("reply_to", json!(reply_to)), acting_user_id)
            .await?;
        Ok(())
    }

    async fn update_service_template_postage(
        &self,
        service_id: &str,
        template_id: &str,
        postage: Postage,
        acting_user_id: &str,
    ) -> ClientResult<()> {
        self.update_template_fields(service_id, template_id, single("postage", json!(postage)), acting_user_id)
            .await?;
        Ok(())
    }

    async fn get_reply_to_email_addresses(&self, service_id: &str) -> ClientResult<Vec<EmailReplyToAddress>> {
        self.get_list(&format!("/service/{}/email-reply-to", service_id)).await
    }

    async fn get_sms_senders(&self, service_id: &str) -> ClientResult<Vec<SmsSender>> {
        self.get_list(&format!("/service/{}/sms-sender", service_id)).await
    }

    async fn get_letter_contacts(&self, service_id: &str) -> ClientResult<Vec<LetterContact>> {
        self.get_list(&format!("/service/{}/letter-contact", service_id)).await
    }

    async fn update_letter_contact(
        &self,
        service_id: &str,
        letter_contact_id: &str,
        contact_block: &str,
        is_default: bool,
    ) -> ClientResult<()> {
        self.client
            .post(
                &format!("/service/{}/letter-contact/{}", service_id, letter_contact_id),
                &json!({ "contact_block": contact_block, "is_default": is_default }),
            )
            .await?;
        Ok(())
    }

    async fn get_service_data_retention(&self, service_id: &str) -> ClientResult<Vec<DataRetention>> {
        self.get_list(&format!("/service/{}/data-retention", service_id)).await
    }
}
