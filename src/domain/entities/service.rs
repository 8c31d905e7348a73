use serde::{Deserialize, Serialize};

use super::template::TemplateType;

fn default_permissions() -> Vec<String> {
    TemplateType::ALL.iter().map(|t| t.as_str().to_string()).collect()
}

fn default_true() -> bool {
    true
}

/// Service record as returned by `GET /service/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceData {
    pub id: String,
    pub name: String,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub restricted: bool,
    #[serde(default = "default_permissions")]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub research_mode: bool,
    #[serde(default)]
    pub email_from: Option<String>,
    #[serde(default)]
    pub email_branding: Option<String>,
    #[serde(default)]
    pub letter_branding: Option<String>,
    #[serde(default)]
    pub default_branding_is_french: bool,
    #[serde(default)]
    pub message_limit: Option<i64>,
    #[serde(default)]
    pub sms_daily_limit: Option<i64>,
    #[serde(default)]
    pub prefix_sms: bool,
    #[serde(default)]
    pub organisation: Option<String>,
    #[serde(default)]
    pub go_live_user: Option<String>,
    #[serde(default)]
    pub count_as_live: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailReplyToAddress {
    pub id: String,
    pub email_address: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmsSender {
    pub id: String,
    pub sms_sender: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub inbound_number_id: Option<String>,
}

impl SmsSender {
    /// "(default)", "(receives replies)" or "(default and receives replies)".
    pub fn hint(&self) -> Option<String> {
        let mut hints = Vec::new();
        if self.is_default {
            hints.push("default");
        }
        if self.inbound_number_id.is_some() {
            hints.push("receives replies");
        }
        if hints.is_empty() {
            None
        } else {
            Some(format!("({})", hints.join(" and ")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterContact {
    pub id: String,
    pub contact_block: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataRetention {
    pub id: String,
    pub notification_type: String,
    pub days_of_retention: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailBranding {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub colour: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LetterBranding {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub filename: Option<String>,
}

/// A sender of any channel, reduced to what the sender picker shows.
#[derive(Debug, Clone, PartialEq)]
pub struct SenderDetails {
    pub id: String,
    pub label: String,
    pub is_default: bool,
}

impl From<&EmailReplyToAddress> for SenderDetails {
    fn from(a: &EmailReplyToAddress) -> Self {
        Self {
            id: a.id.clone(),
            label: a.email_address.clone(),
            is_default: a.is_default,
        }
    }
}

impl From<&SmsSender> for SenderDetails {
    fn from(s: &SmsSender) -> Self {
        Self {
            id: s.id.clone(),
            label: s.sms_sender.clone(),
            is_default: s.is_default,
        }
    }
}

impl From<&LetterContact> for SenderDetails {
    fn from(c: &LetterContact) -> Self {
        Self {
            id: c.id.clone(),
            label: c.contact_block.clone(),
            is_default: c.is_default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_service_defaults_to_all_channel_permissions() {
        let service: ServiceData = serde_json::from_value(json!({
            "id": "service-1",
            "name": "Test Service"
        }))
        .unwrap();
        assert_eq!(service.permissions, vec!["email", "sms", "letter"]);
        assert!(service.active);
        assert!(!service.restricted);
    }

    #[test]
    fn test_sms_sender_hints() {
        let mut sender = SmsSender {
            id: "1".to_string(),
            sms_sender: "GOVUK".to_string(),
            is_default: true,
            inbound_number_id: None,
        };
        assert_eq!(sender.hint().as_deref(), Some("(default)"));

        sender.inbound_number_id = Some("inbound".to_string());
        assert_eq!(sender.hint().as_deref(), Some("(default and receives replies)"));

        sender.is_default = false;
        assert_eq!(sender.hint().as_deref(), Some("(receives replies)"));

        sender.inbound_number_id = None;
        assert_eq!(sender.hint(), None);
    }
}
