use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Email,
    Sms,
    Letter,
}

impl TemplateType {
    pub const ALL: [TemplateType; 3] = [TemplateType::Email, TemplateType::Sms, TemplateType::Letter];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Email => "email",
            TemplateType::Sms => "sms",
            TemplateType::Letter => "letter",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateType::Email => "Email",
            TemplateType::Sms => "Text message",
            TemplateType::Letter => "Letter",
        }
    }

    pub fn has_subject(&self) -> bool {
        !matches!(self, TemplateType::Sms)
    }
}

impl std::fmt::Display for TemplateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TemplateType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(TemplateType::Email),
            "sms" => Ok(TemplateType::Sms),
            "letter" => Ok(TemplateType::Letter),
            _ => Err(format!("Invalid template type: {}", s)),
        }
    }
}

/// Template type as used to filter listings: `all` or one concrete type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TemplateTypeFilter {
    #[default]
    All,
    Only(TemplateType),
}

impl TemplateTypeFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateTypeFilter::All => "all",
            TemplateTypeFilter::Only(t) => t.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TemplateTypeFilter::All => "All",
            TemplateTypeFilter::Only(t) => t.label(),
        }
    }

    pub fn matches(&self, template_type: TemplateType) -> bool {
        match self {
            TemplateTypeFilter::All => true,
            TemplateTypeFilter::Only(t) => *t == template_type,
        }
    }
}

impl std::fmt::Display for TemplateTypeFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TemplateTypeFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            return Ok(TemplateTypeFilter::All);
        }
        s.parse().map(TemplateTypeFilter::Only)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessType {
    Bulk,
    #[default]
    Normal,
    Priority,
}

impl ProcessType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessType::Bulk => "bulk",
            ProcessType::Normal => "normal",
            ProcessType::Priority => "priority",
        }
    }
}

impl std::str::FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bulk" => Ok(ProcessType::Bulk),
            "normal" => Ok(ProcessType::Normal),
            "priority" => Ok(ProcessType::Priority),
            _ => Err(format!("Invalid process type: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Postage {
    First,
    Second,
}

impl Postage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Postage::First => "first",
            Postage::Second => "second",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Postage::First => "First class",
            Postage::Second => "Second class",
        }
    }
}

impl std::str::FromStr for Postage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(Postage::First),
            "second" => Ok(Postage::Second),
            _ => Err(format!("Invalid postage: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub template_type: TemplateType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub process_type: Option<ProcessType>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub postage: Option<Postage>,
    #[serde(default)]
    pub reply_to: Option<String>,
    #[serde(default)]
    pub reply_to_text: Option<String>,
    #[serde(default)]
    pub service_letter_contact: Option<String>,
    #[serde(default)]
    pub version: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub redact_personalisation: bool,
}

impl Template {
    pub fn process_type_or_default(&self) -> ProcessType {
        self.process_type.unwrap_or_default()
    }
}

/// Fields sent to the API when creating or updating a template.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateDraftFields {
    pub name: String,
    pub template_type: TemplateType,
    pub content: String,
    pub subject: Option<String>,
    pub process_type: ProcessType,
}

/// The most recent notification sent from a template.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateLastUsed {
    pub created_at: String,
    #[serde(default)]
    pub template_id: Option<String>,
}
