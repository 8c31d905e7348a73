use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error(transparent)]
    Api(#[from] ApiClientError),
}

pub type DomainResult<T> = Result<T, DomainError>;

/// Body of an error response from the notification API.
///
/// The API answers validation failures with a map of field name to messages
/// and everything else with a plain string.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiErrorMessage {
    Text(String),
    Fields(BTreeMap<String, Vec<String>>),
}

impl ApiErrorMessage {
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => ApiErrorMessage::Text(s.clone()),
            serde_json::Value::Object(map) => {
                let fields = map
                    .iter()
                    .map(|(field, messages)| {
                        let messages = match messages {
                            serde_json::Value::Array(items) => items
                                .iter()
                                .map(|m| m.as_str().map(str::to_string).unwrap_or_else(|| m.to_string()))
                                .collect(),
                            serde_json::Value::String(s) => vec![s.clone()],
                            other => vec![other.to_string()],
                        };
                        (field.clone(), messages)
                    })
                    .collect();
                ApiErrorMessage::Fields(fields)
            }
            other => ApiErrorMessage::Text(other.to_string()),
        }
    }

    pub fn field(&self, name: &str) -> &[String] {
        match self {
            ApiErrorMessage::Fields(fields) => fields.get(name).map(Vec::as_slice).unwrap_or(&[]),
            ApiErrorMessage::Text(_) => &[],
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        match self {
            ApiErrorMessage::Text(s) => s.contains(needle),
            ApiErrorMessage::Fields(fields) => fields
                .values()
                .flatten()
                .any(|message| message.contains(needle)),
        }
    }
}

impl fmt::Display for ApiErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiErrorMessage::Text(s) => write!(f, "{}", s),
            ApiErrorMessage::Fields(fields) => {
                let joined: Vec<String> = fields
                    .iter()
                    .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
                    .collect();
                write!(f, "{}", joined.join("; "))
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiClientError {
    #[error("API returned {status}: {message}")]
    Http { status: u16, message: ApiErrorMessage },
    #[error("Request failed: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Messages the API attached to a single field of a 400 response.
    pub fn field_messages(&self, field: &str) -> Vec<String> {
        match self {
            ApiClientError::Http { status: 400, message } => message.field(field).to_vec(),
            _ => Vec::new(),
        }
    }

    /// The API rejected the template content as longer than the channel allows.
    pub fn is_content_too_long(&self) -> bool {
        self.field_messages("content")
            .iter()
            .any(|m| m.contains("character count greater than"))
    }
}

pub type ClientResult<T> = Result<T, ApiClientError>;

#[derive(Error, Debug)]
#[error("Key-value store error: {0}")]
pub struct StoreError(pub String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_content_too_long_detected_from_field_messages() {
        let err = ApiClientError::Http {
            status: 400,
            message: ApiErrorMessage::from_json(&json!({
                "content": ["Content has a character count greater than the limit of 459"]
            })),
        };
        assert!(err.is_content_too_long());
        assert_eq!(err.field_messages("content").len(), 1);
    }

    #[test]
    fn test_content_too_long_requires_bad_request() {
        let err = ApiClientError::Http {
            status: 500,
            message: ApiErrorMessage::from_json(&json!({
                "content": ["Content has a character count greater than the limit of 459"]
            })),
        };
        assert!(!err.is_content_too_long());
    }

    #[test]
    fn test_text_message_contains() {
        let message = ApiErrorMessage::from_json(&json!("Folder is not empty"));
        assert!(message.contains("Folder is not empty"));
        assert!(message.field("content").is_empty());
    }
}
