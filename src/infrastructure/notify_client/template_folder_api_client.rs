use async_trait::async_trait;
use serde_json::json;

use super::api_cache::{template_version_key, templates_key, ApiCache};
use super::base_client::{field, NotifyClient};
use crate::domain::entities::{FolderContents, TemplateFolder};
use crate::domain::errors::{ApiClientError, ApiErrorMessage, ClientResult};
use crate::domain::ports::TemplateFolderApi;

/// Folder endpoints. Moving templates changes their `folder`, so a move
/// drops the cached template list and each moved template.
#[derive(Clone)]
pub struct TemplateFolderApiClient {
    client: NotifyClient,
    cache: ApiCache,
}

impl TemplateFolderApiClient {
    pub fn new(client: NotifyClient, cache: ApiCache) -> Self {
        Self { client, cache }
    }
}

#[async_trait]
impl TemplateFolderApi for TemplateFolderApiClient {
    async fn create_template_folder(
        &self,
        service_id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> ClientResult<String> {
        let response = self
            .client
            .post(
                &format!("/service/{}/template-folder", service_id),
                &json!({ "name": name, "parent_id": parent_id }),
            )
            .await?;
        let created: TemplateFolder = field(response, "data")?;
        Ok(created.id)
    }

    async fn get_template_folders(&self, service_id: &str) -> ClientResult<Vec<TemplateFolder>> {
        let response = self
            .client
            .get(&format!("/service/{}/template-folder", service_id))
            .await?;
        field(response, "template_folders")
    }

    async fn get_template_folder(&self, service_id: &str, folder_id: &str) -> ClientResult<TemplateFolder> {
        self.get_template_folders(service_id)
            .await?
            .into_iter()
            .find(|folder| folder.id == folder_id)
            .ok_or_else(|| ApiClientError::Http {
                status: 404,
                message: ApiErrorMessage::Text(format!("Template folder {} not found", folder_id)),
            })
    }

    async fn update_template_folder(
        &self,
        service_id: &str,
        folder_id: &str,
        name: &str,
        users_with_permission: Option<Vec<String>>,
    ) -> ClientResult<()> {
        let mut body = json!({ "name": name });
        if let Some(users) = users_with_permission {
            body["users_with_permission"] = json!(users);
        }
        self.client
            .post(
                &format!("/service/{}/template-folder/{}", service_id, folder_id),
                &body,
            )
            .await?;
        Ok(())
    }

    async fn move_to_folder(
        &self,
        service_id: &str,
        folder_id: Option<&str>,
        contents: &FolderContents,
    ) -> ClientResult<()> {
        let path = match folder_id {
            Some(id) => format!("/service/{}/template-folder/{}/contents", service_id, id),
            None => format!("/service/{}/template-folder/contents", service_id),
        };
        self.client.post(&path, &json!(contents)).await?;

        let mut stale = vec![templates_key(service_id)];
        stale.extend(
            contents
                .templates
                .iter()
                .map(|template_id| template_version_key(template_id, None)),
        );
        self.cache.invalidate(&stale).await;
        Ok(())
    }

    async fn delete_template_folder(&self, service_id: &str, folder_id: &str) -> ClientResult<()> {
        self.client
            .delete(&format!("/service/{}/template-folder/{}", service_id, folder_id))
            .await?;
        Ok(())
    }
}
