use crate::application::services::PreviewDraftStore;
use crate::config::Config;
use crate::domain::ports::{KeyValueStore, NotifyApis};
use crate::infrastructure::http::middleware::AppState;
use crate::infrastructure::notify_client::{
    ApiCache, BrandingClient, NotifyClient, ServiceApiClient, TemplateFolderApiClient, TemplatePrefillClient,
    TemplatePreviewClient, TemplateStatisticsClient, UserApiClient,
};
use crate::infrastructure::persistence::{MemoryStore, NullStore, RedisStore};
use std::sync::Arc;

/// Backing stores for API responses and preview drafts.
pub struct Stores {
    pub api_cache: Arc<dyn KeyValueStore>,
    pub drafts: Arc<dyn KeyValueStore>,
}

/// With Redis, both share one client. Without it API responses are not
/// cached and drafts are kept in memory.
pub fn build_stores(config: &Config) -> Result<Stores, Box<dyn std::error::Error>> {
    if config.redis_enabled {
        let store: Arc<dyn KeyValueStore> = Arc::new(RedisStore::new(&config.redis_url)?);
        tracing::info!("Key-value store: Redis");
        Ok(Stores {
            api_cache: store.clone(),
            drafts: store,
        })
    } else {
        tracing::info!("API cache disabled and drafts kept in memory (REDIS_ENABLED is off)");
        Ok(Stores {
            api_cache: Arc::new(NullStore),
            drafts: Arc::new(MemoryStore::new()),
        })
    }
}

pub fn build_apis(config: &Config, api_cache: Arc<dyn KeyValueStore>) -> Result<NotifyApis, Box<dyn std::error::Error>> {
    let client = NotifyClient::new(
        &config.api_host_name,
        &config.admin_client_user_name,
        &config.admin_client_secret,
    )?;
    tracing::info!("Notification API client initialized for {}", config.api_host_name);

    let template_preview = TemplatePreviewClient::new(
        &config.template_preview_api_host,
        &config.template_preview_api_key,
    )?;
    let template_prefill = TemplatePrefillClient::new(&config.template_prefill_api_host)?;
    let cache = ApiCache::new(api_cache, config.api_cache_ttl());

    Ok(NotifyApis {
        services: Arc::new(ServiceApiClient::new(client.clone(), cache.clone())),
        template_folders: Arc::new(TemplateFolderApiClient::new(client.clone(), cache)),
        template_statistics: Arc::new(TemplateStatisticsClient::new(client.clone())),
        users: Arc::new(UserApiClient::new(client.clone())),
        branding: Arc::new(BrandingClient::new(client)),
        template_preview: Arc::new(template_preview),
        template_prefill: Arc::new(template_prefill),
    })
}

pub async fn build_app_state(config: &Config) -> Result<AppState, Box<dyn std::error::Error>> {
    let stores = build_stores(config)?;
    let apis = build_apis(config, stores.api_cache)?;

    let drafts = PreviewDraftStore::new(stores.drafts);
    tracing::info!("Preview draft store initialized");

    Ok(AppState {
        apis,
        drafts,
        cookie_key: config.cookie_key()?,
        activity_stats_limit_days: config.activity_stats_limit_days,
        show_styleguide: config.show_styleguide,
    })
}
