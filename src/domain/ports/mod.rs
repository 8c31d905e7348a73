pub mod branding_api;
pub mod key_value_store;
pub mod service_api;
pub mod template_folder_api;
pub mod template_prefill_api;
pub mod template_preview_api;
pub mod template_statistics_api;
pub mod user_api;

pub use branding_api::BrandingApi;
pub use key_value_store::KeyValueStore;
pub use service_api::ServiceApi;
pub use template_folder_api::TemplateFolderApi;
pub use template_prefill_api::TemplatePrefillApi;
pub use template_preview_api::{PreviewFileType, RenderedPreview, TemplatePreviewApi};
pub use template_statistics_api::TemplateStatisticsApi;
pub use user_api::UserApi;

use std::sync::Arc;

/// Every remote collaborator the console talks to, as shared handles.
#[derive(Clone)]
pub struct NotifyApis {
    pub services: Arc<dyn ServiceApi>,
    pub template_folders: Arc<dyn TemplateFolderApi>,
    pub template_statistics: Arc<dyn TemplateStatisticsApi>,
    pub users: Arc<dyn UserApi>,
    pub branding: Arc<dyn BrandingApi>,
    pub template_preview: Arc<dyn TemplatePreviewApi>,
    pub template_prefill: Arc<dyn TemplatePrefillApi>,
}
