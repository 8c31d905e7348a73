use async_trait::async_trait;
use notify_admin::domain::entities::{
    DataRetention, EmailBranding, EmailReplyToAddress, FolderContents, LetterBranding, LetterContact, Postage,
    ServiceData, SmsSender, Template, TemplateDraftFields, TemplateFolder, TemplateLastUsed, User,
};
use notify_admin::domain::errors::{ApiClientError, ApiErrorMessage, ClientResult};
use notify_admin::domain::ports::{
    BrandingApi, NotifyApis, PreviewFileType, RenderedPreview, ServiceApi, TemplateFolderApi, TemplatePrefillApi,
    TemplatePreviewApi, TemplateStatisticsApi, UserApi,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Everything the fake notification API knows, plus a log of what it was
/// asked to change.
#[derive(Default)]
pub struct FakeData {
    pub services: Vec<ServiceData>,
    pub templates: HashMap<String, Vec<Template>>,
    pub folders: HashMap<String, Vec<TemplateFolder>>,
    pub users: Vec<User>,
    pub reply_to_addresses: Vec<EmailReplyToAddress>,
    pub sms_senders: Vec<SmsSender>,
    pub letter_contacts: Vec<LetterContact>,
    pub last_used: Option<TemplateLastUsed>,
    pub letter_page_count: u32,
    pub prefill: serde_json::Value,

    /// Status and JSON body for the next template create or update.
    pub template_save_error: Option<(u16, serde_json::Value)>,
    /// Status and JSON body for the next folder delete.
    pub folder_delete_error: Option<(u16, serde_json::Value)>,

    pub created_templates: Vec<(TemplateDraftFields, Option<String>)>,
    pub updated_templates: Vec<(String, TemplateDraftFields)>,
    pub deleted_templates: Vec<String>,
    pub redacted_templates: Vec<String>,
    pub created_folders: Vec<(String, Option<String>)>,
    pub updated_folders: Vec<(String, String, Option<Vec<String>>)>,
    pub deleted_folders: Vec<String>,
    pub moves: Vec<(Option<String>, FolderContents)>,
    pub sender_updates: Vec<(String, Option<String>)>,
    pub postage_updates: Vec<(String, Postage)>,
    pub get_service_calls: usize,
    pub get_templates_calls: usize,
}

#[derive(Clone, Default)]
pub struct FakeNotify {
    pub data: Arc<Mutex<FakeData>>,
}

fn http_error(status: u16, body: serde_json::Value) -> ApiClientError {
    ApiClientError::Http {
        status,
        message: ApiErrorMessage::from_json(&body),
    }
}

fn not_found(what: &str) -> ApiClientError {
    http_error(404, serde_json::json!(format!("{} not found", what)))
}

impl FakeNotify {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<F: FnOnce(&mut FakeData)>(&self, f: F) -> &Self {
        f(&mut self.data.lock().unwrap());
        self
    }

    pub fn read<T, F: FnOnce(&FakeData) -> T>(&self, f: F) -> T {
        f(&self.data.lock().unwrap())
    }

    pub fn apis(&self) -> NotifyApis {
        NotifyApis {
            services: Arc::new(self.clone()),
            template_folders: Arc::new(self.clone()),
            template_statistics: Arc::new(self.clone()),
            users: Arc::new(self.clone()),
            branding: Arc::new(self.clone()),
            template_preview: Arc::new(self.clone()),
            template_prefill: Arc::new(self.clone()),
        }
    }

    fn find_template(&self, service_id: &str, template_id: &str) -> ClientResult<Template> {
        self.read(|d| {
            d.templates
                .get(service_id)
                .and_then(|templates| templates.iter().find(|t| t.id == template_id))
                .cloned()
                .ok_or_else(|| not_found("Template"))
        })
    }
}

#[async_trait]
impl ServiceApi for FakeNotify {
    async fn get_service(&self, service_id: &str) -> ClientResult<ServiceData> {
        let mut data = self.data.lock().unwrap();
        data.get_service_calls += 1;
        data.services
            .iter()
            .find(|s| s.id == service_id)
            .cloned()
            .ok_or_else(|| not_found("Service"))
    }

    async fn update_service(
        &self,
        service_id: &str,
        changes: serde_json::Map<String, serde_json::Value>,
        _acting_user_id: &str,
    ) -> ClientResult<ServiceData> {
        let mut data = self.data.lock().unwrap();
        let service = data
            .services
            .iter_mut()
            .find(|s| s.id == service_id)
            .ok_or_else(|| not_found("Service"))?;
        if let Some(permissions) = changes.get("permissions") {
            service.permissions = serde_json::from_value(permissions.clone()).unwrap_or_default();
        }
        if let Some(research_mode) = changes.get("research_mode").and_then(|v| v.as_bool()) {
            service.research_mode = research_mode;
        }
        Ok(service.clone())
    }

    async fn get_service_templates(&self, service_id: &str) -> ClientResult<Vec<Template>> {
        let mut data = self.data.lock().unwrap();
        data.get_templates_calls += 1;
        Ok(data.templates.get(service_id).cloned().unwrap_or_default())
    }

    async fn get_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        version: Option<i64>,
    ) -> ClientResult<Template> {
        let mut template = self.find_template(service_id, template_id)?;
        if let Some(version) = version {
            template.version = Some(version);
        }
        Ok(template)
    }

    async fn get_service_template_versions(&self, service_id: &str, template_id: &str) -> ClientResult<Vec<Template>> {
        let current = self.find_template(service_id, template_id)?;
        let latest = current.version.unwrap_or(1);
        Ok((1..=latest)
            .rev()
            .map(|version| {
                let mut template = current.clone();
                template.version = Some(version);
                template
            })
            .collect())
    }

    async fn create_service_template(
        &self,
        service_id: &str,
        fields: &TemplateDraftFields,
        parent_folder_id: Option<&str>,
        _acting_user_id: &str,
    ) -> ClientResult<Template> {
        let mut data = self.data.lock().unwrap();
        if let Some((status, body)) = data.template_save_error.take() {
            return Err(http_error(status, body));
        }
        data.created_templates
            .push((fields.clone(), parent_folder_id.map(str::to_string)));
        let mut template = super::fixtures::template(
            &uuid::Uuid::new_v4().to_string(),
            &fields.name,
            fields.template_type,
            &fields.content,
        );
        template.subject = fields.subject.clone();
        template.folder = parent_folder_id.map(str::to_string);
        template.service = Some(service_id.to_string());
        data.templates
            .entry(service_id.to_string())
            .or_default()
            .push(template.clone());
        Ok(template)
    }

    async fn update_service_template(
        &self,
        service_id: &str,
        template_id: &str,
        fields: &TemplateDraftFields,
        _acting_user_id: &str,
    ) -> ClientResult<Template> {
        let mut data = self.data.lock().unwrap();
        if let Some((status, body)) = data.template_save_error.take() {
            return Err(http_error(status, body));
        }
        data.updated_templates
            .push((template_id.to_string(), fields.clone()));
        let template = data
            .templates
            .get_mut(service_id)
            .and_then(|templates| templates.iter_mut().find(|t| t.id == template_id))
            .ok_or_else(|| not_found("Template"))?;
        template.name = fields.name.clone();
        template.content = fields.content.clone();
        template.subject = fields.subject.clone();
        template.version = Some(template.version.unwrap_or(1) + 1);
        Ok(template.clone())
    }

    async fn delete_service_template(&self, service_id: &str, template_id: &str, _acting_user_id: &str) -> ClientResult<()> {
        let mut data = self.data.lock().unwrap();
        data.deleted_templates.push(template_id.to_string());
        if let Some(templates) = data.templates.get_mut(service_id) {
            templates.retain(|t| t.id != template_id);
        }
        Ok(())
    }

    async fn redact_service_template(&self, _service_id: &str, template_id: &str, _acting_user_id: &str) -> ClientResult<()> {
        self.with(|d| d.redacted_templates.push(template_id.to_string()));
        Ok(())
    }

    async fn update_service_template_sender(
        &self,
        _service_id: &str,
        template_id: &str,
        reply_to: Option<&str>,
        _acting_user_id: &str,
    ) -> ClientResult<()> {
        self.with(|d| {
            d.sender_updates
                .push((template_id.to_string(), reply_to.map(str::to_string)))
        });
        Ok(())
    }

    async fn update_service_template_postage(
        &self,
        _service_id: &str,
        template_id: &str,
        postage: Postage,
        _acting_user_id: &str,
    ) -> ClientResult<()> {
        self.with(|d| d.postage_updates.push((template_id.to_string(), postage)));
        Ok(())
    }

    async fn get_reply_to_email_addresses(&self, _service_id: &str) -> ClientResult<Vec<EmailReplyToAddress>> {
        Ok(self.read(|d| d.reply_to_addresses.clone()))
    }

    async fn get_sms_senders(&self, _service_id: &str) -> ClientResult<Vec<SmsSender>> {
        Ok(self.read(|d| d.sms_senders.clone()))
    }

    async fn get_letter_contacts(&self, _service_id: &str) -> ClientResult<Vec<LetterContact>> {
        Ok(self.read(|d| d.letter_contacts.clone()))
    }

    async fn update_letter_contact(
        &self,
        _service_id: &str,
        letter_contact_id: &str,
        contact_block: &str,
        is_default: bool,
    ) -> ClientResult<()> {
        self.with(|d| {
            if let Some(contact) = d.letter_contacts.iter_mut().find(|c| c.id == letter_contact_id) {
                contact.contact_block = contact_block.to_string();
                contact.is_default = is_default;
            }
        });
        Ok(())
    }

    async fn get_service_data_retention(&self, _service_id: &str) -> ClientResult<Vec<DataRetention>> {
        Ok(Vec::new())
    }
}

#[async_trait]
impl TemplateFolderApi for FakeNotify {
    async fn create_template_folder(&self, service_id: &str, name: &str, parent_id: Option<&str>) -> ClientResult<String> {
        let id = uuid::Uuid::new_v4().to_string();
        self.with(|d| {
            d.created_folders
                .push((name.to_string(), parent_id.map(str::to_string)));
            d.folders
                .entry(service_id.to_string())
                .or_default()
                .push(super::fixtures::folder(&id, name, parent_id, &[]));
        });
        Ok(id)
    }

    async fn get_template_folders(&self, service_id: &str) -> ClientResult<Vec<TemplateFolder>> {
        Ok(self.read(|d| d.folders.get(service_id).cloned().unwrap_or_default()))
    }

    async fn get_template_folder(&self, service_id: &str, folder_id: &str) -> ClientResult<TemplateFolder> {
        self.read(|d| {
            d.folders
                .get(service_id)
                .and_then(|folders| folders.iter().find(|f| f.id == folder_id))
                .cloned()
                .ok_or_else(|| not_found("Folder"))
        })
    }

    async fn update_template_folder(
        &self,
        _service_id: &str,
        folder_id: &str,
        name: &str,
        users_with_permission: Option<Vec<String>>,
    ) -> ClientResult<()> {
        self.with(|d| {
            d.updated_folders
                .push((folder_id.to_string(), name.to_string(), users_with_permission))
        });
        Ok(())
    }

    async fn move_to_folder(&self, _service_id: &str, folder_id: Option<&str>, contents: &FolderContents) -> ClientResult<()> {
        self.with(|d| d.moves.push((folder_id.map(str::to_string), contents.clone())));
        Ok(())
    }

    async fn delete_template_folder(&self, _service_id: &str, folder_id: &str) -> ClientResult<()> {
        let mut data = self.data.lock().unwrap();
        if let Some((status, body)) = data.folder_delete_error.take() {
            return Err(http_error(status, body));
        }
        data.deleted_folders.push(folder_id.to_string());
        Ok(())
    }
}

#[async_trait]
impl TemplateStatisticsApi for FakeNotify {
    async fn get_template_statistics_for_template(
        &self,
        _service_id: &str,
        _template_id: &str,
    ) -> ClientResult<Option<TemplateLastUsed>> {
        Ok(self.read(|d| d.last_used.clone()))
    }
}

#[async_trait]
impl UserApi for FakeNotify {
    async fn get_user(&self, user_id: &str) -> ClientResult<User> {
        self.read(|d| {
            d.users
                .iter()
                .find(|u| u.id == user_id)
                .cloned()
                .ok_or_else(|| not_found("User"))
        })
    }

    async fn get_users_for_service(&self, service_id: &str) -> ClientResult<Vec<User>> {
        Ok(self.read(|d| {
            d.users
                .iter()
                .filter(|u| u.belongs_to_service(service_id))
                .cloned()
                .collect()
        }))
    }

    async fn get_services_for_user(&self, user_id: &str) -> ClientResult<Vec<ServiceData>> {
        Ok(self.read(|d| {
            let services: Vec<String> = d
                .users
                .iter()
                .find(|u| u.id == user_id)
                .map(|u| u.services.clone())
                .unwrap_or_default();
            d.services
                .iter()
                .filter(|s| services.contains(&s.id))
                .cloned()
                .collect()
        }))
    }
}

#[async_trait]
impl BrandingApi for FakeNotify {
    async fn get_email_branding(&self, branding_id: &str) -> ClientResult<EmailBranding> {
        Ok(EmailBranding {
            id: branding_id.to_string(),
            name: "Example branding".to_string(),
            colour: None,
            logo: None,
        })
    }

    async fn get_letter_branding(&self, branding_id: &str) -> ClientResult<LetterBranding> {
        Ok(LetterBranding {
            id: branding_id.to_string(),
            name: "Example letter branding".to_string(),
            filename: Some("example".to_string()),
        })
    }

    async fn get_inbound_number_for_service(&self, _service_id: &str) -> ClientResult<String> {
        Ok(String::new())
    }
}

#[async_trait]
impl TemplatePreviewApi for FakeNotify {
    async fn render(
        &self,
        _template: &Template,
        filetype: PreviewFileType,
        page: Option<u32>,
        _branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview> {
        Ok(RenderedPreview {
            content_type: filetype.content_type().to_string(),
            bytes: format!("{}:{}", filetype.as_str(), page.unwrap_or(1)).into_bytes(),
        })
    }

    async fn page_count(&self, _template: &Template) -> ClientResult<u32> {
        Ok(self.read(|d| d.letter_page_count.max(1)))
    }

    async fn render_example(
        &self,
        _subject: &str,
        _content: &str,
        branding_filename: Option<&str>,
    ) -> ClientResult<RenderedPreview> {
        Ok(RenderedPreview {
            content_type: "image/png".to_string(),
            bytes: branding_filename.unwrap_or("none").as_bytes().to_vec(),
        })
    }
}

#[async_trait]
impl TemplatePrefillApi for FakeNotify {
    async fn get_template(&self, _template_id: &str) -> ClientResult<serde_json::Value> {
        Ok(self.read(|d| d.prefill.clone()))
    }
}
