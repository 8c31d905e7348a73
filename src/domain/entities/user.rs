use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::template_folder::TemplateFolder;

/// Permission names as the notification API stores them.
pub mod permissions {
    pub const MANAGE_TEMPLATES: &str = "manage_templates";
    pub const MANAGE_SERVICE: &str = "manage_service";
    pub const MANAGE_API_KEYS: &str = "manage_api_keys";
    pub const SEND_MESSAGES: &str = "send_messages";
    pub const VIEW_ACTIVITY: &str = "view_activity";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub email_address: String,
    #[serde(default)]
    pub platform_admin: bool,
    #[serde(default = "default_state")]
    pub state: String,
    #[serde(default)]
    pub permissions: HashMap<String, Vec<String>>,
    #[serde(default)]
    pub services: Vec<String>,
}

fn default_state() -> String {
    "active".to_string()
}

impl User {
    pub fn is_active(&self) -> bool {
        self.state == "active"
    }

    pub fn belongs_to_service(&self, service_id: &str) -> bool {
        self.services.iter().any(|id| id == service_id)
    }

    pub fn has_permission_for_service(&self, service_id: &str, permission: &str) -> bool {
        self.permissions
            .get(service_id)
            .map(|perms| perms.iter().any(|p| p == permission))
            .unwrap_or(false)
    }

    /// Whether the user may act on the service with any of `any_of`.
    ///
    /// An empty list asks only for membership of the service. Platform admins
    /// pass unless `restrict_admin_usage` is set.
    pub fn has_permissions(&self, service_id: &str, any_of: &[&str], restrict_admin_usage: bool) -> bool {
        if !self.is_active() {
            return false;
        }
        if self.platform_admin && !restrict_admin_usage {
            return true;
        }
        if any_of.is_empty() {
            return self.belongs_to_service(service_id) || self.permissions.contains_key(service_id);
        }
        any_of
            .iter()
            .any(|permission| self.has_permission_for_service(service_id, permission))
    }

    /// The root folder (`None`) is visible to everyone.
    pub fn has_template_folder_permission(&self, folder: Option<&TemplateFolder>) -> bool {
        if self.platform_admin {
            return true;
        }
        match folder {
            None => true,
            Some(folder) => folder.users_with_permission.iter().any(|id| id == &self.id),
        }
    }
}
