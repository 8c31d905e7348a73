use std::collections::BTreeMap;

use serde::Deserialize;
use validator::{Validate, ValidationErrors};

use crate::domain::entities::{Postage, ProcessType, TemplateType};
use crate::domain::services::{placeholder_bodies, sms_content_error};

pub const REQUIRED_MESSAGE: &str = "This cannot be empty";
pub const NOT_A_VALID_CHOICE: &str = "Not a valid choice";
/// Value of the "move to" radio that means the top level.
pub const MOVE_TO_ROOT: &str = "__NONE__";

/// Messages per field, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn extend_field(&mut self, field: &str, messages: impl IntoIterator<Item = String>) {
        for message in messages {
            self.add(field, message);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    /// First message for the field, or an empty string.
    pub fn first(&self, field: &str) -> String {
        self.fields
            .get(field)
            .and_then(|messages| messages.first())
            .cloned()
            .unwrap_or_default()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    fn into_result(self) -> Result<(), FormErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::default();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| error.code.to_string());
                form_errors.add(field, message);
            }
        }
        form_errors
    }
}

fn derive_errors<T: Validate>(form: &T) -> FormErrors {
    form.validate().err().map(FormErrors::from).unwrap_or_default()
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(|v| v.trim().is_empty()).unwrap_or(true)
}

/// "You can’t put commas between double brackets" for `((a,b))`.
pub fn commas_in_placeholders_error(text: &str) -> Option<String> {
    placeholder_bodies(text)
        .any(|body| body.contains(','))
        .then(|| "You can’t put commas between double brackets".to_string())
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTemplateForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Select the type of template you want to add"))]
    pub what_type: String,
}

/// Name, subject and body of an email, text message or letter template.
///
/// The same fields back all three kinds; [`TemplateForm::validate_for`]
/// applies the rules of the kind being edited.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TemplateForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    #[validate(length(min = 1, message = "This cannot be empty"))]
    pub template_content: String,
    #[serde(default)]
    pub process_type: Option<String>,
    #[serde(default)]
    pub button_pressed: Option<String>,
    #[serde(default)]
    pub confirm: Option<String>,
}

impl TemplateForm {
    pub fn validate_for(&self, template_type: TemplateType) -> Result<(), FormErrors> {
        let mut errors = derive_errors(self);

        if self.name.trim().is_empty() && !errors.has("name") {
            errors.add("name", REQUIRED_MESSAGE);
        }
        if self.template_content.trim().is_empty() && !errors.has("template_content") {
            errors.add("template_content", REQUIRED_MESSAGE);
        }

        if template_type.has_subject() {
            if is_blank(self.subject.as_deref()) {
                errors.add("subject", REQUIRED_MESSAGE);
            } else if let Some(message) = self.subject.as_deref().and_then(commas_in_placeholders_error) {
                errors.add("subject", message);
            }
        }

        if let Some(message) = commas_in_placeholders_error(&self.template_content) {
            errors.add("template_content", message);
        }
        if template_type == TemplateType::Sms {
            if let Some(message) = sms_content_error(&self.template_content) {
                errors.add("template_content", message);
            }
        }

        if self.process_type.is_some() && self.parsed_process_type().is_none() {
            errors.add("process_type", NOT_A_VALID_CHOICE);
        }

        errors.into_result()
    }

    /// Unset means normal.
    pub fn parsed_process_type(&self) -> Option<ProcessType> {
        match self.process_type.as_deref() {
            None | Some("") => Some(ProcessType::Normal),
            Some(value) => value.parse().ok(),
        }
    }

    pub fn is_preview(&self) -> bool {
        self.button_pressed.as_deref() == Some("preview")
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirm.as_deref().map(|c| !c.is_empty()).unwrap_or(false)
    }

    /// Subject trimmed, or none for text messages.
    pub fn subject_for(&self, template_type: TemplateType) -> Option<String> {
        if template_type.has_subject() {
            self.subject.as_deref().map(|s| s.trim().to_string())
        } else {
            None
        }
    }
}

/// The two buttons under a template preview.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreviewTemplateForm {
    #[serde(default)]
    pub button_pressed: String,
}

impl PreviewTemplateForm {
    pub fn is_edit(&self) -> bool {
        self.button_pressed == "edit"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LetterTemplatePostageForm {
    #[serde(default)]
    pub postage: String,
}

impl LetterTemplatePostageForm {
    pub fn validate_postage(&self) -> Result<Postage, FormErrors> {
        self.postage.parse().map_err(|_| {
            let mut errors = FormErrors::default();
            errors.add("postage", "Choose a postage class");
            errors
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TemplateFolderForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This cannot be empty"))]
    pub name: String,
    #[serde(default)]
    pub users_with_permission: Vec<String>,
}

impl TemplateFolderForm {
    pub fn validate_form(&self) -> Result<(), FormErrors> {
        let mut errors = derive_errors(self);
        if self.name.trim().is_empty() && !errors.has("name") {
            errors.add("name", REQUIRED_MESSAGE);
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FolderOperation {
    MoveToExistingFolder,
    MoveToNewFolder,
    AddNewFolder,
}

impl FolderOperation {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "move-to-existing-folder" => Some(FolderOperation::MoveToExistingFolder),
            "move-to-new-folder" => Some(FolderOperation::MoveToNewFolder),
            "add-new-folder" => Some(FolderOperation::AddNewFolder),
            _ => None,
        }
    }
}

/// Ticked templates and folders on the listing page, plus what to do with
/// them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateAndFoldersSelectionForm {
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub templates_and_folders: Vec<String>,
    #[serde(default)]
    pub move_to: Option<String>,
    #[serde(default)]
    pub add_new_folder_name: Option<String>,
    #[serde(default)]
    pub move_to_new_folder_name: Option<String>,
}

impl TemplateAndFoldersSelectionForm {
    pub fn operation(&self) -> Option<FolderOperation> {
        FolderOperation::parse(&self.operation)
    }

    /// `valid_move_to` holds the folder ids the user may move things into.
    pub fn validate_with(&self, valid_move_to: &[String]) -> Result<FolderOperation, FormErrors> {
        let mut errors = FormErrors::default();
        let Some(operation) = self.operation() else {
            errors.add("operation", NOT_A_VALID_CHOICE);
            return Err(errors);
        };

        match operation {
            FolderOperation::MoveToExistingFolder | FolderOperation::MoveToNewFolder => {
                if self.templates_and_folders.is_empty() {
                    errors.add("templates_and_folders", "Select at least one template or folder");
                }
            }
            FolderOperation::AddNewFolder => {}
        }

        match operation {
            FolderOperation::MoveToExistingFolder => match self.move_to.as_deref() {
                None | Some("") => errors.add("move_to", "Select a folder"),
                Some(MOVE_TO_ROOT) => {}
                Some(id) if valid_move_to.iter().any(|v| v == id) => {}
                Some(_) => errors.add("move_to", NOT_A_VALID_CHOICE),
            },
            FolderOperation::MoveToNewFolder => {
                if is_blank(self.move_to_new_folder_name.as_deref()) {
                    errors.add("move_to_new_folder_name", REQUIRED_MESSAGE);
                }
            }
            FolderOperation::AddNewFolder => {
                if is_blank(self.add_new_folder_name.as_deref()) {
                    errors.add("add_new_folder_name", REQUIRED_MESSAGE);
                }
            }
        }

        errors.into_result().map(|_| operation)
    }

    pub fn is_move_op(&self) -> bool {
        matches!(
            self.operation(),
            Some(FolderOperation::MoveToExistingFolder | FolderOperation::MoveToNewFolder)
        )
    }

    pub fn is_add_folder_op(&self) -> bool {
        matches!(
            self.operation(),
            Some(FolderOperation::AddNewFolder | FolderOperation::MoveToNewFolder)
        )
    }

    /// Name of the folder to create, for either "new folder" operation.
    pub fn get_folder_name(&self) -> Option<String> {
        let name = match self.operation()? {
            FolderOperation::AddNewFolder => self.add_new_folder_name.as_deref(),
            FolderOperation::MoveToNewFolder => self.move_to_new_folder_name.as_deref(),
            FolderOperation::MoveToExistingFolder => None,
        };
        name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
    }

    /// `None` is the top level.
    pub fn move_to_folder_id(&self) -> Option<&str> {
        match self.move_to.as_deref() {
            None | Some("") | Some(MOVE_TO_ROOT) => None,
            Some(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetTemplateSenderForm {
    #[serde(default)]
    pub sender: String,
}

impl SetTemplateSenderForm {
    /// Blank means no sender.
    pub fn validate_sender(&self, valid_ids: &[String]) -> Result<Option<String>, FormErrors> {
        if self.sender.is_empty() {
            return Ok(None);
        }
        if valid_ids.iter().any(|id| id == &self.sender) {
            return Ok(Some(self.sender.clone()));
        }
        let mut errors = FormErrors::default();
        errors.add("sender", NOT_A_VALID_CHOICE);
        Err(errors)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddRecipientsForm {
    #[serde(default)]
    pub what_type: String,
    #[serde(default)]
    pub placeholder_value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientChoice {
    ManyRecipients,
    OneRecipient,
}

impl AddRecipientsForm {
    pub fn validate_for(&self, template_type: TemplateType) -> Result<RecipientChoice, FormErrors> {
        let mut errors = FormErrors::default();
        let choice = match self.what_type.as_str() {
            "many_recipients" => RecipientChoice::ManyRecipients,
            "one_recipient" => RecipientChoice::OneRecipient,
            _ => {
                errors.add("what_type", "Select how you want to add recipients");
                return Err(errors);
            }
        };
        if choice == RecipientChoice::ManyRecipients {
            return Ok(choice);
        }

        let value = self.placeholder_value.trim();
        if value.is_empty() {
            errors.add("placeholder_value", REQUIRED_MESSAGE);
        } else {
            match template_type {
                TemplateType::Email => {
                    if !email_address::EmailAddress::is_valid(value) {
                        errors.add("placeholder_value", "Enter a valid email address");
                    }
                }
                TemplateType::Sms => {
                    if let Some(message) = phone_number_error(value) {
                        errors.add("placeholder_value", message);
                    }
                }
                TemplateType::Letter => errors.add("placeholder_value", NOT_A_VALID_CHOICE),
            }
        }
        errors.into_result().map(|_| choice)
    }
}

/// Digits with optional `+`, spaces, dashes, dots and brackets.
pub fn phone_number_error(value: &str) -> Option<&'static str> {
    if value
        .chars()
        .any(|c| !(c.is_ascii_digit() || matches!(c, '+' | ' ' | '-' | '.' | '(' | ')')))
    {
        return Some("Must not contain letters or symbols");
    }
    let digits = value.chars().filter(char::is_ascii_digit).count();
    if digits < 10 {
        return Some("Not enough digits");
    }
    if digits > 15 {
        return Some("Too many digits");
    }
    None
}
