use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::PreviewDraft;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::KeyValueStore;

/// Drafts expire a day after they were last written.
pub const PREVIEW_DRAFT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub fn preview_draft_key(service_id: &str, template_id: Option<&str>) -> String {
    format!("template-preview:{}:{}", service_id, template_id.unwrap_or("None"))
}

/// Unsaved template edits, one per service and template (or none for a
/// template that doesn't exist yet).
#[derive(Clone)]
pub struct PreviewDraftStore {
    store: Arc<dyn KeyValueStore>,
}

impl PreviewDraftStore {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn set(&self, service_id: &str, template_id: Option<&str>, draft: &PreviewDraft) -> DomainResult<()> {
        let key = preview_draft_key(service_id, template_id);
        let value = serde_json::to_string(draft)
            .map_err(|e| DomainError::Internal(format!("Failed to encode preview draft: {}", e)))?;
        self.store
            .set(&key, &value, PREVIEW_DRAFT_TTL)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        metrics::counter!("preview_draft_operations_total", "operation" => "set").increment(1);
        Ok(())
    }

    /// An absent, expired or unreadable draft comes back empty.
    pub async fn get(&self, service_id: &str, template_id: Option<&str>) -> PreviewDraft {
        let key = preview_draft_key(service_id, template_id);
        metrics::counter!("preview_draft_operations_total", "operation" => "get").increment(1);
        match self.store.get(&key).await {
            Ok(Some(value)) => serde_json::from_str(&value).unwrap_or_else(|e| {
                tracing::warn!("Discarding unreadable preview draft {}: {}", key, e);
                PreviewDraft::default()
            }),
            Ok(None) => PreviewDraft::default(),
            Err(e) => {
                tracing::warn!("Failed to read preview draft {}: {}", key, e);
                PreviewDraft::default()
            }
        }
    }

    pub async fn delete(&self, service_id: &str, template_id: Option<&str>) -> DomainResult<()> {
        let key = preview_draft_key(service_id, template_id);
        self.store
            .delete(&key)
            .await
            .map_err(|e| DomainError::Internal(e.to_string()))?;
        metrics::counter!("preview_draft_operations_total", "operation" => "delete").increment(1);
        Ok(())
    }
}
