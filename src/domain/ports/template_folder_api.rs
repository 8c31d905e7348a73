use crate::domain::entities::{FolderContents, TemplateFolder};
use crate::domain::errors::ClientResult;
use async_trait::async_trait;

#[async_trait]
pub trait TemplateFolderApi: Send + Sync {
    /// Returns the id of the new folder.
    async fn create_template_folder(
        &self,
        service_id: &str,
        name: &str,
        parent_id: Option<&str>,
    ) -> ClientResult<String>;
    async fn get_template_folders(&self, service_id: &str) -> ClientResult<Vec<TemplateFolder>>;
    async fn get_template_folder(
        &self,
        service_id: &str,
        folder_id: &str,
    ) -> ClientResult<TemplateFolder>;
    /// `users_with_permission` of `None` leaves the folder's users unchanged.
    async fn update_template_folder(
        &self,
        service_id: &str,
        folder_id: &str,
        name: &str,
        users_with_permission: Option<Vec<String>>,
    ) -> ClientResult<()>;
    /// Moves into `folder_id`, or to the top level when it is `None`.
    async fn move_to_folder(
        &self,
        service_id: &str,
        folder_id: Option<&str>,
        contents: &FolderContents,
    ) -> ClientResult<()>;
    async fn delete_template_folder(&self, service_id: &str, folder_id: &str) -> ClientResult<()>;
}
