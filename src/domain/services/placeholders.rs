use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::entities::{PreviewDraft, Template, TemplateType};

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(\(([^()]+)\)\)").expect("Invalid placeholder regex"));

/// Key placeholders are compared by: lowercase, ignoring spaces, dashes and
/// underscores.
pub fn normalise_placeholder(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-') && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Raw text between every `((` and `))`.
pub fn placeholder_bodies(text: &str) -> impl Iterator<Item = &str> {
    PLACEHOLDER
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
}

/// Placeholder names in order of first appearance, without duplicates.
///
/// For a conditional block `((name??text))` only `name` counts.
pub fn extract_placeholders(texts: &[&str]) -> Vec<String> {
    let mut seen = Vec::new();
    let mut names = Vec::new();
    for text in texts {
        for body in placeholder_bodies(text) {
            let name = body.split("??").next().unwrap_or(body).trim().to_string();
            let key = normalise_placeholder(&name);
            if !seen.contains(&key) {
                seen.push(key);
                names.push(name);
            }
        }
    }
    names
}

/// The parts of a template that can hold placeholders.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateBody {
    pub template_type: TemplateType,
    pub subject: Option<String>,
    pub content: String,
}

impl TemplateBody {
    pub fn placeholders(&self) -> Vec<String> {
        let mut texts = Vec::with_capacity(2);
        if self.template_type.has_subject() {
            if let Some(subject) = &self.subject {
                texts.push(subject.as_str());
            }
        }
        texts.push(self.content.as_str());
        extract_placeholders(&texts)
    }

    pub fn compare_to(&self, new: &TemplateBody) -> TemplateChange {
        TemplateChange::between(&self.placeholders(), &new.placeholders())
    }
}

impl From<&Template> for TemplateBody {
    fn from(template: &Template) -> Self {
        Self {
            template_type: template.template_type,
            subject: template.subject.clone(),
            content: template.content.clone(),
        }
    }
}

impl TemplateBody {
    pub fn from_draft(template_type: TemplateType, draft: &PreviewDraft) -> Self {
        Self {
            template_type,
            subject: draft.subject.clone(),
            content: draft.content.clone(),
        }
    }
}

/// Placeholders gained and lost between two versions of a template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TemplateChange {
    pub placeholders_added: Vec<String>,
    pub placeholders_removed: Vec<String>,
}

impl TemplateChange {
    pub fn between(old: &[String], new: &[String]) -> Self {
        let old_keys: Vec<String> = old.iter().map(|p| normalise_placeholder(p)).collect();
        let new_keys: Vec<String> = new.iter().map(|p| normalise_placeholder(p)).collect();

        Self {
            placeholders_added: new
                .iter()
                .zip(&new_keys)
                .filter(|(_, key)| !old_keys.contains(key))
                .map(|(p, _)| p.clone())
                .collect(),
            placeholders_removed: old
                .iter()
                .zip(&old_keys)
                .filter(|(_, key)| !new_keys.contains(key))
                .map(|(p, _)| p.clone())
                .collect(),
        }
    }

    pub fn has_different_placeholders(&self) -> bool {
        !self.placeholders_added.is_empty() || !self.placeholders_removed.is_empty()
    }
}
