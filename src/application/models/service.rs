use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use crate::domain::entities::{
    DataRetention, EmailBranding, EmailReplyToAddress, FolderContents, LetterBranding, LetterContact,
    SenderDetails, ServiceData, SmsSender, Template, TemplateFolder, TemplateType, User,
};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::ports::NotifyApis;
use crate::domain::services::TemplateCatalog;

pub const ENGLISH_SIGNATURE: &str = "English Government of Canada signature";
pub const FRENCH_SIGNATURE: &str = "French Government of Canada signature";

/// One service as seen during a single request.
///
/// Reads go to the API the first time they are needed and are kept until
/// the request ends; writes always go straight through.
pub struct Service {
    data: ServiceData,
    apis: NotifyApis,
    activity_stats_limit_days: i64,
    all_templates: OnceCell<Vec<Template>>,
    all_template_folders: OnceCell<Vec<TemplateFolder>>,
    email_reply_to_addresses: OnceCell<Vec<EmailReplyToAddress>>,
    sms_senders: OnceCell<Vec<SmsSender>>,
    letter_contact_details: OnceCell<Vec<LetterContact>>,
    data_retention: OnceCell<Vec<DataRetention>>,
    email_branding: OnceCell<Option<EmailBranding>>,
    letter_branding: OnceCell<Option<LetterBranding>>,
    inbound_number: OnceCell<String>,
    active_users: OnceCell<Vec<User>>,
}

impl Service {
    pub fn new(data: ServiceData, apis: NotifyApis, activity_stats_limit_days: i64) -> Self {
        Self {
            data,
            apis,
            activity_stats_limit_days,
            all_templates: OnceCell::new(),
            all_template_folders: OnceCell::new(),
            email_reply_to_addresses: OnceCell::new(),
            sms_senders: OnceCell::new(),
            letter_contact_details: OnceCell::new(),
            data_retention: OnceCell::new(),
            email_branding: OnceCell::new(),
            letter_branding: OnceCell::new(),
            inbound_number: OnceCell::new(),
            active_users: OnceCell::new(),
        }
    }

    pub async fn from_id(apis: &NotifyApis, service_id: &str, activity_stats_limit_days: i64) -> DomainResult<Self> {
        let data = apis.services.get_service(service_id).await?;
        Ok(Self::new(data, apis.clone(), activity_stats_limit_days))
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn data(&self) -> &ServiceData {
        &self.data
    }

    pub fn permissions(&self) -> &[String] {
        &self.data.permissions
    }

    pub async fn update(&self, changes: Map<String, Value>, acting_user_id: &str) -> DomainResult<ServiceData> {
        Ok(self
            .apis
            .services
            .update_service(self.id(), changes, acting_user_id)
            .await?)
    }

    pub async fn force_permission(&self, permission: &str, on: bool, acting_user_id: &str) -> DomainResult<ServiceData> {
        let mut permissions: Vec<String> = self
            .data
            .permissions
            .iter()
            .filter(|p| p.as_str() != permission)
            .cloned()
            .collect();
        if on {
            permissions.push(permission.to_string());
        }
        self.update_permissions(permissions, acting_user_id).await
    }

    pub async fn update_permissions(&self, permissions: Vec<String>, acting_user_id: &str) -> DomainResult<ServiceData> {
        let mut changes = Map::new();
        changes.insert("permissions".to_string(), json!(permissions));
        self.update(changes, acting_user_id).await
    }

    pub async fn toggle_research_mode(&self, acting_user_id: &str) -> DomainResult<ServiceData> {
        let mut changes = Map::new();
        changes.insert("research_mode".to_string(), json!(!self.data.research_mode));
        self.update(changes, acting_user_id).await
    }

    pub fn trial_mode(&self) -> bool {
        self.data.restricted
    }

    pub fn live(&self) -> bool {
        !self.trial_mode()
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.data.permissions.iter().any(|p| p == permission)
    }

    pub fn available_template_types(&self) -> Vec<TemplateType> {
        TemplateType::ALL
            .into_iter()
            .filter(|t| self.has_permission(t.as_str()))
            .collect()
    }

    /// Templates of the types this service can send.
    pub async fn all_templates(&self) -> DomainResult<&[Template]> {
        let templates = self
            .all_templates
            .get_or_try_init(|| async {
                let available = self.available_template_types();
                let templates = self.apis.services.get_service_templates(self.id()).await?;
                Ok::<_, DomainError>(
                    templates
                        .into_iter()
                        .filter(|t| available.contains(&t.template_type))
                        .collect(),
                )
            })
            .await?;
        Ok(templates)
    }

    pub async fn all_template_ids(&self) -> DomainResult<HashSet<String>> {
        Ok(self.all_templates().await?.iter().map(|t| t.id.clone()).collect())
    }

    /// Folders sorted by name, ignoring case.
    pub async fn all_template_folders(&self) -> DomainResult<&[TemplateFolder]> {
        let folders = self
            .all_template_folders
            .get_or_try_init(|| async {
                let mut folders = self.apis.template_folders.get_template_folders(self.id()).await?;
                folders.sort_by_key(|f| f.name.to_lowercase());
                Ok::<_, DomainError>(folders)
            })
            .await?;
        Ok(folders)
    }

    pub async fn catalog(&self) -> DomainResult<TemplateCatalog<'_>> {
        let templates = self.all_templates().await?;
        let folders = self.all_template_folders().await?;
        Ok(TemplateCatalog::new(templates, folders))
    }

    pub async fn has_templates(&self) -> DomainResult<bool> {
        Ok(!self.all_templates().await?.is_empty())
    }

    pub async fn has_folders(&self) -> DomainResult<bool> {
        Ok(!self.all_template_folders().await?.is_empty())
    }

    pub async fn has_multiple_template_types(&self) -> DomainResult<bool> {
        let types: HashSet<TemplateType> = self.all_templates().await?.iter().map(|t| t.template_type).collect();
        Ok(types.len() > 1)
    }

    pub async fn get_template(&self, template_id: &str, version: Option<i64>) -> DomainResult<Template> {
        Ok(self
            .apis
            .services
            .get_service_template(self.id(), template_id, version)
            .await?)
    }

    /// `Ok(None)` is the top level, which everyone may see.
    pub async fn get_template_folder_with_user_permission_or_403(
        &self,
        folder_id: Option<&str>,
        user: &User,
    ) -> DomainResult<Option<TemplateFolder>> {
        let catalog = self.catalog().await?;
        let folder = catalog.get_template_folder(folder_id)?;
        if !user.has_template_folder_permission(folder) {
            return Err(DomainError::Forbidden(format!(
                "User {} cannot see template folder {}",
                user.id,
                folder_id.unwrap_or("None")
            )));
        }
        Ok(folder.cloned())
    }

    pub async fn get_template_with_user_permission_or_403(&self, template_id: &str, user: &User) -> DomainResult<Template> {
        let template = self.get_template(template_id, None).await?;
        self.get_template_folder_with_user_permission_or_403(template.folder.as_deref(), user)
            .await?;
        Ok(template)
    }

    /// Moves the given ids, skipping any that aren't this service's
    /// templates or folders.
    pub async fn move_to_folder(&self, ids_to_move: &[String], move_to: Option<&str>) -> DomainResult<FolderContents> {
        let catalog = self.catalog().await?;
        let template_ids = catalog.template_ids();
        let folder_ids = catalog.folder_ids();

        let mut contents = FolderContents::default();
        for id in ids_to_move {
            if template_ids.contains(id.as_str()) && !contents.templates.contains(id) {
                contents.templates.push(id.clone());
            } else if folder_ids.contains(id.as_str()) && !contents.folders.contains(id) {
                contents.folders.push(id.clone());
            }
        }

        self.apis
            .template_folders
            .move_to_folder(self.id(), move_to, &contents)
            .await?;
        Ok(contents)
    }

    pub async fn email_reply_to_addresses(&self) -> DomainResult<&[EmailReplyToAddress]> {
        let addresses = self
            .email_reply_to_addresses
            .get_or_try_init(|| async {
                Ok::<_, DomainError>(self.apis.services.get_reply_to_email_addresses(self.id()).await?)
            })
            .await?;
        Ok(addresses)
    }

    pub async fn default_email_reply_to_address(&self) -> DomainResult<Option<String>> {
        Ok(self
            .email_reply_to_addresses()
            .await?
            .iter()
            .find(|a| a.is_default)
            .map(|a| a.email_address.clone()))
    }

    pub async fn sms_senders(&self) -> DomainResult<&[SmsSender]> {
        let senders = self
            .sms_senders
            .get_or_try_init(|| async { Ok::<_, DomainError>(self.apis.services.get_sms_senders(self.id()).await?) })
            .await?;
        Ok(senders)
    }

    pub async fn sms_senders_with_hints(&self) -> DomainResult<Vec<(SmsSender, Option<String>)>> {
        Ok(self
            .sms_senders()
            .await?
            .iter()
            .map(|s| (s.clone(), s.hint()))
            .collect())
    }

    pub async fn default_sms_sender(&self) -> DomainResult<Option<String>> {
        Ok(self
            .sms_senders()
            .await?
            .iter()
            .find(|s| s.is_default)
            .map(|s| s.sms_sender.clone()))
    }

    pub async fn letter_contact_details(&self) -> DomainResult<&[LetterContact]> {
        let contacts = self
            .letter_contact_details
            .get_or_try_init(|| async { Ok::<_, DomainError>(self.apis.services.get_letter_contacts(self.id()).await?) })
            .await?;
        Ok(contacts)
    }

    pub async fn default_letter_contact_block(&self) -> DomainResult<Option<LetterContact>> {
        Ok(self
            .letter_contact_details()
            .await?
            .iter()
            .find(|c| c.is_default)
            .cloned())
    }

    pub async fn edit_letter_contact_block(&self, id: &str, contact_block: &str, is_default: bool) -> DomainResult<()> {
        self.apis
            .services
            .update_letter_contact(self.id(), id, contact_block, is_default)
            .await?;
        Ok(())
    }

    pub async fn remove_default_letter_contact_block(&self) -> DomainResult<()> {
        if let Some(contact) = self.default_letter_contact_block().await? {
            self.edit_letter_contact_block(&contact.id, &contact.contact_block, false)
                .await?;
        }
        Ok(())
    }

    /// The senders offered for a template of the given type.
    pub async fn sender_details(&self, template_type: TemplateType) -> DomainResult<Vec<SenderDetails>> {
        Ok(match template_type {
            TemplateType::Email => self.email_reply_to_addresses().await?.iter().map(SenderDetails::from).collect(),
            TemplateType::Sms => self.sms_senders().await?.iter().map(SenderDetails::from).collect(),
            TemplateType::Letter => self.letter_contact_details().await?.iter().map(SenderDetails::from).collect(),
        })
    }

    pub async fn data_retention(&self) -> DomainResult<&[DataRetention]> {
        let retention = self
            .data_retention
            .get_or_try_init(|| async {
                Ok::<_, DomainError>(self.apis.services.get_service_data_retention(self.id()).await?)
            })
            .await?;
        Ok(retention)
    }

    pub async fn days_of_retention(&self, notification_type: &str) -> DomainResult<i64> {
        Ok(self
            .data_retention()
            .await?
            .iter()
            .find(|r| r.notification_type == notification_type)
            .map(|r| r.days_of_retention)
            .unwrap_or(self.activity_stats_limit_days))
    }

    pub async fn email_branding(&self) -> DomainResult<Option<&EmailBranding>> {
        let branding = self
            .email_branding
            .get_or_try_init(|| async {
                match self.data.email_branding.as_deref() {
                    Some(id) => Ok::<_, DomainError>(Some(self.apis.branding.get_email_branding(id).await?)),
                    None => Ok(None),
                }
            })
            .await?;
        Ok(branding.as_ref())
    }

    /// Falls back to the government signature in the service's default
    /// language.
    pub async fn email_branding_name(&self) -> DomainResult<String> {
        Ok(match self.email_branding().await? {
            Some(branding) => branding.name.clone(),
            None if self.data.default_branding_is_french => FRENCH_SIGNATURE.to_string(),
            None => ENGLISH_SIGNATURE.to_string(),
        })
    }

    pub async fn letter_branding(&self) -> DomainResult<Option<&LetterBranding>> {
        let branding = self
            .letter_branding
            .get_or_try_init(|| async {
                match self.data.letter_branding.as_deref() {
                    Some(id) => Ok::<_, DomainError>(Some(self.apis.branding.get_letter_branding(id).await?)),
                    None => Ok(None),
                }
            })
            .await?;
        Ok(branding.as_ref())
    }

    pub async fn inbound_number(&self) -> DomainResult<&str> {
        let number = self
            .inbound_number
            .get_or_try_init(|| async {
                Ok::<_, DomainError>(self.apis.branding.get_inbound_number_for_service(self.id()).await?)
            })
            .await?;
        Ok(number)
    }

    pub async fn has_inbound_number(&self) -> DomainResult<bool> {
        Ok(!self.inbound_number().await?.is_empty())
    }

    pub async fn active_users(&self) -> DomainResult<&[User]> {
        let users = self
            .active_users
            .get_or_try_init(|| async {
                let users = self.apis.users.get_users_for_service(self.id()).await?;
                Ok::<_, DomainError>(users.into_iter().filter(User::is_active).collect())
            })
            .await?;
        Ok(users)
    }
}
