pub mod api_cache;
pub mod authentication;
pub mod base_client;
pub mod branding_client;
pub mod service_api_client;
pub mod template_folder_api_client;
pub mod template_prefill_client;
pub mod template_preview_client;
pub mod template_statistics_client;
pub mod user_api_client;

pub use api_cache::ApiCache;
pub use base_client::NotifyClient;
pub use branding_client::BrandingClient;
pub use service_api_client::ServiceApiClient;
pub use template_folder_api_client::TemplateFolderApiClient;
pub use template_prefill_client::TemplatePrefillClient;
pub use template_preview_client::TemplatePreviewClient;
pub use template_statistics_client::TemplateStatisticsClient;
pub use user_api_client::UserApiClient;
