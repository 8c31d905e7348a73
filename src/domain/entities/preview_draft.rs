use serde::{Deserialize, Serialize};

use super::template::{ProcessType, TemplateType};

/// An unsaved template edit carried between the edit, preview and save pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewDraft {
    pub id: Option<String>,
    pub name: String,
    pub content: String,
    pub template_content: Option<String>,
    pub subject: Option<String>,
    pub template_type: Option<TemplateType>,
    pub process_type: Option<ProcessType>,
    pub folder: Option<String>,
    pub reply_to_text: Option<String>,
}

impl PreviewDraft {
    pub fn is_empty(&self) -> bool {
        self.template_type.is_none() && self.content.is_empty() && self.name.is_empty()
    }
}
