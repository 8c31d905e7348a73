use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::errors::ClientResult;
use crate::domain::ports::KeyValueStore;

pub(crate) fn service_key(service_id: &str) -> String {
    format!("service-{}", service_id)
}

pub(crate) fn templates_key(service_id: &str) -> String {
    format!("service-{}-templates", service_id)
}

pub(crate) fn template_version_key(template_id: &str, version: Option<i64>) -> String {
    match version {
        Some(v) => format!("template-{}-version-{}", template_id, v),
        None => format!("template-{}-version-None", template_id),
    }
}

pub(crate) fn template_versions_key(template_id: &str) -> String {
    format!("template-{}-versions", template_id)
}

/// Read-through cache for API responses, shared by every client that
/// reads or writes the cached keys. Cache failures fall back to the API.
#[derive(Clone)]
pub struct ApiCache {
    store: Arc<dyn KeyValueStore>,
    ttl: Duration,
}

impl ApiCache {
    pub fn new(store: Arc<dyn KeyValueStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub(crate) async fn cached<T, F, Fut>(&self, key: &str, fetch: F) -> ClientResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<T>>,
    {
        match self.store.get(key).await {
            Ok(Some(cached)) => match serde_json::from_str(&cached) {
                Ok(value) => return Ok(value),
                Err(e) => tracing::warn!("Ignoring unreadable cache entry {}: {}", key, e),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!("Cache read for {} failed: {}", key, e),
        }

        let value = fetch().await?;
        match serde_json::to_string(&value) {
            Ok(encoded) => {
                if let Err(e) = self.store.set(key, &encoded, self.ttl).await {
                    tracing::warn!("Cache write for {} failed: {}", key, e);
                }
            }
            Err(e) => tracing::warn!("Could not encode {} for the cache: {}", key, e),
        }
        Ok(value)
    }

    pub(crate) async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            if let Err(e) = self.store.delete(key).await {
                tracing::warn!("Cache delete for {} failed: {}", key, e);
            }
        }
    }
}
