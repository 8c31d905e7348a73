use askama::Template as AskamaTemplate;
use axum::{
    extract::{OriginalUri, Path, Query, Request, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::Form;
use serde::Deserialize;
use serde_json::json;

use crate::application::models::{Service, TemplateList, TemplateListItem};
use crate::domain::entities::{
    permissions, FolderPathItem, Template, TemplateDraftFields, TemplateType, TemplateTypeFilter, User,
    ROOT_FOLDER_NAME,
};
use crate::domain::ports::PreviewFileType;
use crate::domain::services::{email_or_sms_not_enabled, should_skip_template_page, TemplateBody};
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebError, WebResult};
use crate::shared::{Flash, FlashMessage};

use super::forms::{
    CreateTemplateForm, FormErrors, TemplateAndFoldersSelectionForm, MOVE_TO_ROOT, NOT_A_VALID_CHOICE,
};
use super::{api_error_message, letters, parse_form, template_editor, urls, HtmlTemplate, TemplateRef};

pub const LETTER_MAX_PAGE_COUNT: u32 = 10;

#[derive(Debug, Clone)]
pub struct Crumb {
    pub name: String,
    pub url: String,
}

pub fn folder_crumbs(service_id: &str, filter: TemplateTypeFilter, path: &[FolderPathItem]) -> Vec<Crumb> {
    path.iter()
        .map(|item| Crumb {
            name: item.name.clone(),
            url: urls::choose_template(service_id, filter, item.id.as_deref()),
        })
        .collect()
}

/// Where letter page images for a template come from.
#[derive(Debug, Clone, Copy)]
pub enum LetterPreviewUrls {
    Current,
    Version(i64),
    Hidden,
}

/// A template reduced to what the pages show.
#[derive(Debug, Clone)]
pub struct TemplateView {
    pub id: String,
    pub name: String,
    pub template_type: String,
    pub type_label: String,
    pub has_subject: bool,
    pub subject: String,
    pub content: String,
    pub placeholders: Vec<String>,
    pub is_email: bool,
    pub is_sms: bool,
    pub is_letter: bool,
    pub from_name: String,
    pub reply_to_text: String,
    pub postage: String,
    pub process_type: String,
    pub redact_personalisation: bool,
    pub version: i64,
    pub updated_at: String,
    pub letter_image_urls: Vec<String>,
    pub letter_pdf_url: String,
    pub page_count: u32,
    pub letter_too_long: bool,
}

impl TemplateView {
    pub async fn build(
        state: &AppState,
        service: &Service,
        template: &Template,
        letter_urls: LetterPreviewUrls,
    ) -> WebResult<Self> {
        let template_type = template.template_type;
        let reply_to_text = match template.reply_to_text.clone() {
            Some(text) => text,
            None => match template_type {
                TemplateType::Email => service.default_email_reply_to_address().await?,
                TemplateType::Sms => service.default_sms_sender().await?,
                TemplateType::Letter => service
                    .default_letter_contact_block()
                    .await?
                    .map(|contact| contact.contact_block),
            }
            .unwrap_or_default(),
        };

        let page_count = if template_type == TemplateType::Letter {
            state.apis.template_preview.page_count(template).await?
        } else {
            0
        };

        let (letter_image_urls, letter_pdf_url) = match (template_type, letter_urls) {
            (TemplateType::Letter, LetterPreviewUrls::Current) => (
                (1..=page_count)
                    .map(|page| urls::letter_preview(service.id(), &template.id, PreviewFileType::Png, Some(page)))
                    .collect(),
                urls::letter_preview(service.id(), &template.id, PreviewFileType::Pdf, None),
            ),
            (TemplateType::Letter, LetterPreviewUrls::Version(version)) => (
                vec![urls::letter_version_preview(
                    service.id(),
                    &template.id,
                    version,
                    PreviewFileType::Png,
                )],
                urls::letter_version_preview(service.id(), &template.id, version, PreviewFileType::Pdf),
            ),
            _ => (Vec::new(), String::new()),
        };

        Ok(Self {
            id: template.id.clone(),
            name: template.name.clone(),
            template_type: template_type.as_str().to_string(),
            type_label: template_type.label().to_string(),
            has_subject: template_type.has_subject(),
            subject: template.subject.clone().unwrap_or_default(),
            content: template.content.clone(),
            placeholders: TemplateBody::from(template).placeholders(),
            is_email: template_type == TemplateType::Email,
            is_sms: template_type == TemplateType::Sms,
            is_letter: template_type == TemplateType::Letter,
            from_name: service.name().to_string(),
            reply_to_text,
            postage: template.postage.map(|p| p.label().to_string()).unwrap_or_default(),
            process_type: template.process_type_or_default().as_str().to_string(),
            redact_personalisation: template.redact_personalisation,
            version: template.version.unwrap_or(1),
            updated_at: template
                .updated_at
                .clone()
                .or_else(|| template.created_at.clone())
                .unwrap_or_default(),
            letter_image_urls,
            letter_pdf_url,
            page_count,
            letter_too_long: page_count > LETTER_MAX_PAGE_COUNT,
        })
    }
}

/// Links from a template page to its sub-pages.
#[derive(Debug, Clone)]
pub struct TemplateLinks {
    pub view: String,
    pub edit: String,
    pub delete: String,
    pub redact: String,
    pub versions: String,
    pub sender: String,
    pub postage: String,
    pub send: String,
}

impl TemplateLinks {
    pub fn new(service_id: &str, template_id: &str) -> Self {
        Self {
            view: urls::view_template(service_id, template_id),
            edit: urls::edit_template(service_id, template_id),
            delete: urls::delete_template(service_id, template_id),
            redact: urls::redact_template(service_id, template_id),
            versions: urls::view_template_versions(service_id, template_id),
            sender: urls::set_template_sender(service_id, template_id),
            postage: urls::edit_template_postage(service_id, template_id),
            send: urls::add_recipients(service_id, template_id),
        }
    }
}

#[derive(AskamaTemplate)]
#[template(path = "template.html")]
struct TemplatePage {
    flashes: Vec<FlashMessage>,
    service_name: String,
    template: TemplateView,
    links: TemplateLinks,
    crumbs: Vec<Crumb>,
    user_has_template_permission: bool,
    can_manage_templates: bool,
    can_send: bool,
    show_redaction_message: bool,
}

/// The template page, also shown behind delete and redact confirmations.
pub async fn render_template_page(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    flash: &mut Flash,
    service: &Service,
    template: &Template,
    user_has_template_permission: bool,
    show_redaction_message: bool,
) -> WebResult<HtmlTemplate<impl AskamaTemplate>> {
    let catalog = service.catalog().await?;
    let path = catalog.get_template_folder_path(template.folder.as_deref())?;
    let page = TemplatePage {
        flashes: flash.take_messages(),
        service_name: service.name().to_string(),
        template: TemplateView::build(state, service, template, LetterPreviewUrls::Current).await?,
        links: TemplateLinks::new(service.id(), &template.id),
        crumbs: folder_crumbs(service.id(), TemplateTypeFilter::All, &path),
        user_has_template_permission,
        can_manage_templates: auth_user
            .user
            .has_permissions(service.id(), &[permissions::MANAGE_TEMPLATES], false),
        can_send: auth_user
            .user
            .has_permissions(service.id(), &[permissions::SEND_MESSAGES], true),
        show_redaction_message,
    };
    Ok(HtmlTemplate(page))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChooseQuery {
    pub initial_state: Option<String>,
    pub view: Option<String>,
    pub page: Option<u32>,
    /// Live search term, kept when the page reloads.
    pub search: Option<String>,
}

impl ChooseQuery {
    fn sending_view(&self) -> bool {
        self.view.as_deref() == Some("sending")
    }

    /// The same query for re-rendering a submitted form, which opens with
    /// every action closed.
    fn for_rerender(&self) -> Self {
        Self {
            initial_state: None,
            ..self.clone()
        }
    }
}

/// GET `/services/{service_id}/templates/{template_id}`.
pub async fn show_template_segment(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment)): Path<(String, String)>,
    Query(query): Query<ChooseQuery>,
    flash: Flash,
) -> WebResult<Response> {
    match TemplateRef::parse(&segment)? {
        TemplateRef::Template(template_id) => view_template(&state, &auth_user, flash, &service_id, &template_id).await,
        TemplateRef::File { template_id, filetype } => {
            letters::view_letter_template_preview(&state, &auth_user, &service_id, &template_id, filetype, query.page)
                .await
        }
        TemplateRef::Filter(filter) => {
            auth_user.require_permissions(&service_id, &[], false)?;
            let service = state.load_service(&service_id).await?;
            render_choose(&auth_user, flash, &service, filter, None, &query, FormErrors::default()).await
        }
        TemplateRef::Add(template_type) => {
            template_editor::show_add_template(&state, &auth_user, flash, &service_id, &template_type, None).await
        }
    }
}

/// POST `/services/{service_id}/templates/{template_id}`.
pub async fn submit_template_segment(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment)): Path<(String, String)>,
    Query(query): Query<ChooseQuery>,
    OriginalUri(uri): OriginalUri,
    flash: Flash,
    request: Request,
) -> WebResult<Response> {
    match TemplateRef::parse(&segment)? {
        TemplateRef::Filter(filter) => {
            let form = parse_form(request).await?;
            submit_choose(&state, &auth_user, flash, &uri.to_string(), &service_id, filter, None, &query, form).await
        }
        TemplateRef::Add(template_type) => {
            let form = parse_form(request).await?;
            template_editor::submit_add_template(&state, &auth_user, flash, &service_id, &template_type, None, form)
                .await
        }
        _ => Err(WebError::NotFound("Method not allowed on a template".to_string())),
    }
}

async fn view_template(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    template_id: &str,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    state.drafts.delete(service_id, Some(template_id)).await?;

    let service = state.load_service(service_id).await?;
    let template = service.get_template(template_id, None).await?;
    let user_has_template_permission = {
        let catalog = service.catalog().await?;
        let folder = catalog.get_template_folder(template.folder.as_deref())?;
        auth_user.user.has_template_folder_permission(folder)
    };

    if should_skip_template_page(&auth_user.user, service_id, template.template_type) {
        return Ok(Redirect::to(&urls::send_one_off(service_id, template_id)).into_response());
    }

    let page = render_template_page(
        state,
        auth_user,
        &mut flash,
        &service,
        &template,
        user_has_template_permission,
        false,
    )
    .await?;
    Ok((flash, page).into_response())
}

#[derive(Debug, Clone)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub hint: String,
    pub url: String,
    pub depth: usize,
    pub is_folder: bool,
    pub is_service: bool,
}

pub fn list_rows(service_id: &str, filter: TemplateTypeFilter, items: &[TemplateListItem], sending_view: bool) -> Vec<ListRow> {
    items
        .iter()
        .map(|item| {
            let url = if item.is_folder() {
                let mut url = urls::choose_template(service_id, filter, Some(&item.id));
                if sending_view {
                    url.push_str("?view=sending");
                }
                url
            } else if sending_view {
                urls::add_recipients(service_id, &item.id)
            } else {
                urls::view_template(service_id, &item.id)
            };
            ListRow {
                id: item.id.clone(),
                name: item.name.clone(),
                hint: item.hint.clone(),
                url,
                depth: item.depth(),
                is_folder: item.is_folder(),
                is_service: item.is_service(),
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: String,
    pub url: String,
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct MoveOption {
    pub id: String,
    pub name: String,
    pub hint: String,
}

#[derive(AskamaTemplate)]
#[template(path = "choose.html")]
struct ChoosePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    service_name: String,
    template_type: String,
    current_folder_id: String,
    current_folder_name: String,
    crumbs: Vec<Crumb>,
    rows: Vec<ListRow>,
    templates_to_show: bool,
    show_search_box: bool,
    search: String,
    show_template_nav: bool,
    nav_items: Vec<NavItem>,
    sending_view: bool,
    move_to_options: Vec<MoveOption>,
    can_manage_templates: bool,
    user_has_template_folder_permission: bool,
    initial_state: String,
    errors: FormErrors,
    create_url: String,
    manage_folder_url: String,
}

fn move_to_options(user_folders: Vec<crate::domain::entities::VisibleFolder>, current: Option<&str>) -> Vec<MoveOption> {
    let hint = |id: Option<&str>| {
        if id == current {
            "current folder".to_string()
        } else {
            String::new()
        }
    };
    let mut options = vec![MoveOption {
        id: MOVE_TO_ROOT.to_string(),
        name: ROOT_FOLDER_NAME.to_string(),
        hint: hint(None),
    }];
    options.extend(user_folders.into_iter().map(|folder| MoveOption {
        hint: hint(Some(&folder.id)),
        name: folder.display_name(),
        id: folder.id,
    }));
    options
}

async fn render_choose(
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service: &Service,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
    query: &ChooseQuery,
    errors: FormErrors,
) -> WebResult<Response> {
    let user = &auth_user.user;
    let catalog = service.catalog().await?;
    let folder = catalog.get_template_folder(folder_id)?;
    let path = catalog.get_template_folder_path(folder_id)?;
    let template_list = TemplateList::new(&catalog, service.id(), filter, folder_id, Some(user));
    let sending_view = query.sending_view();

    let nav_items = std::iter::once(TemplateTypeFilter::All)
        .chain(service.available_template_types().into_iter().map(TemplateTypeFilter::Only))
        .map(|key| {
            let mut url = urls::choose_template(service.id(), key, folder_id);
            if sending_view {
                url.push_str("?view=sending");
            }
            NavItem {
                label: key.label().to_string(),
                url,
                selected: key == filter,
            }
        })
        .collect();

    let page = ChoosePage {
        flashes: flash.take_messages(),
        service_id: service.id().to_string(),
        service_name: service.name().to_string(),
        template_type: filter.as_str().to_string(),
        current_folder_id: folder_id.unwrap_or_default().to_string(),
        current_folder_name: path
            .last()
            .map(|item| item.name.clone())
            .unwrap_or_else(|| ROOT_FOLDER_NAME.to_string()),
        crumbs: folder_crumbs(service.id(), filter, &path),
        rows: list_rows(service.id(), filter, template_list.items(), sending_view),
        templates_to_show: template_list.templates_to_show(),
        show_search_box: catalog.count_of_templates_and_folders() > 7,
        search: query.search.clone().unwrap_or_default(),
        show_template_nav: service.has_multiple_template_types().await? && catalog.templates().len() > 2,
        nav_items,
        sending_view,
        move_to_options: move_to_options(catalog.get_user_template_folders(user), folder_id),
        can_manage_templates: user.has_permissions(service.id(), &[permissions::MANAGE_TEMPLATES], false),
        user_has_template_folder_permission: user.has_template_folder_permission(folder),
        initial_state: query.initial_state.clone().unwrap_or_default(),
        errors,
        create_url: urls::create_template(service.id(), filter, folder_id),
        manage_folder_url: folder_id
            .map(|id| urls::manage_template_folder(service.id(), id))
            .unwrap_or_default(),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

#[allow(clippy::too_many_arguments)]
async fn submit_choose(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    current_url: &str,
    service_id: &str,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
    query: &ChooseQuery,
    form: TemplateAndFoldersSelectionForm,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    let service = state.load_service(service_id).await?;
    let valid_move_to: Vec<String> = service
        .catalog()
        .await?
        .get_user_template_folders(&auth_user.user)
        .into_iter()
        .map(|folder| folder.id)
        .collect();

    let errors = match form.validate_with(&valid_move_to) {
        Ok(_) => {
            auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
            match process_folder_management_form(state, &auth_user.user, &service, &form, folder_id).await {
                Ok(()) => return Ok((flash, Redirect::to(current_url)).into_response()),
                Err(err) => flash.error(api_error_message(err)?),
            }
            FormErrors::default()
        }
        Err(errors) => {
            if errors.has("templates_and_folders") {
                flash.error("Select at least one template or folder");
            }
            errors
        }
    };

    render_choose(auth_user, flash, &service, filter, folder_id, &query.for_rerender(), errors).await
}

async fn process_folder_management_form(
    state: &AppState,
    user: &User,
    service: &Service,
    form: &TemplateAndFoldersSelectionForm,
    current_folder_id: Option<&str>,
) -> Result<(), crate::domain::errors::DomainError> {
    service
        .get_template_folder_with_user_permission_or_403(current_folder_id, user)
        .await?;

    let mut new_folder_id = None;
    if form.is_add_folder_op() {
        if let Some(name) = form.get_folder_name() {
            let id = state
                .apis
                .template_folders
                .create_template_folder(service.id(), &name, current_folder_id)
                .await?;
            tracing::info!("Created template folder {} in service {}", id, service.id());
            new_folder_id = Some(id);
        }
    }

    if form.is_move_op() {
        let move_to = new_folder_id.as_deref().or_else(|| form.move_to_folder_id());
        service
            .move_to_folder(&form.templates_and_folders, move_to)
            .await?;
    }
    Ok(())
}

/// GET `/services/{service_id}/templates`.
pub async fn choose_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    Query(query): Query<ChooseQuery>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[], false)?;
    let service = state.load_service(&service_id).await?;
    render_choose(&auth_user, flash, &service, TemplateTypeFilter::All, None, &query, FormErrors::default()).await
}

pub async fn submit_choose_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    Query(query): Query<ChooseQuery>,
    OriginalUri(uri): OriginalUri,
    flash: Flash,
    Form(form): Form<TemplateAndFoldersSelectionForm>,
) -> WebResult<Response> {
    submit_choose(
        &state,
        &auth_user,
        flash,
        &uri.to_string(),
        &service_id,
        TemplateTypeFilter::All,
        None,
        &query,
        form,
    )
    .await
}

/// GET `/services/{service_id}/templates/folders/{folder_id}`.
pub async fn choose_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    Query(query): Query<ChooseQuery>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[], false)?;
    let service = state.load_service(&service_id).await?;
    render_choose(
        &auth_user,
        flash,
        &service,
        TemplateTypeFilter::All,
        Some(&folder_id),
        &query,
        FormErrors::default(),
    )
    .await
}

pub async fn submit_choose_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    Query(query): Query<ChooseQuery>,
    OriginalUri(uri): OriginalUri,
    flash: Flash,
    Form(form): Form<TemplateAndFoldersSelectionForm>,
) -> WebResult<Response> {
    submit_choose(
        &state,
        &auth_user,
        flash,
        &uri.to_string(),
        &service_id,
        TemplateTypeFilter::All,
        Some(&folder_id),
        &query,
        form,
    )
    .await
}

/// `/services/{service_id}/templates/{type}/folders/{folder_id}`, or a
/// template inside a folder when the first segment is an `add-` action.
pub async fn choose_typed_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment, folder_id)): Path<(String, String, String)>,
    Query(query): Query<ChooseQuery>,
    flash: Flash,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    auth_user.require_permissions(&service_id, &[], false)?;
    let service = state.load_service(&service_id).await?;
    render_choose(
        &auth_user,
        flash,
        &service,
        filter,
        Some(&folder_id),
        &query,
        FormErrors::default(),
    )
    .await
}

pub async fn submit_choose_typed_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment, folder_id)): Path<(String, String, String)>,
    Query(query): Query<ChooseQuery>,
    OriginalUri(uri): OriginalUri,
    flash: Flash,
    Form(form): Form<TemplateAndFoldersSelectionForm>,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    submit_choose(
        &state,
        &auth_user,
        flash,
        &uri.to_string(),
        &service_id,
        filter,
        Some(&folder_id),
        &query,
        form,
    )
    .await
}

#[derive(AskamaTemplate)]
#[template(path = "start_tour.html")]
struct StartTourPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template: TemplateView,
    send_url: String,
}

pub async fn start_tour(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::VIEW_ACTIVITY], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service.get_template(&template_id, None).await?;
    if template.template_type != TemplateType::Email {
        return Err(WebError::not_found());
    }

    let page = StartTourPage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        template: TemplateView::build(&state, &service, &template, LetterPreviewUrls::Hidden).await?,
        send_url: urls::send_one_off(&service_id, &template_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

#[derive(Debug, Clone)]
pub struct ChoiceOption {
    pub value: String,
    pub label: String,
    pub hint: String,
    pub checked: bool,
}

#[derive(AskamaTemplate)]
#[template(path = "create.html")]
struct CreateTemplatePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    back_url: String,
    options: Vec<ChoiceOption>,
    errors: FormErrors,
}

async fn render_create(
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service: &Service,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
    selected: &str,
    errors: FormErrors,
) -> WebResult<Response> {
    let mut choices: Vec<(String, String)> = vec![
        (TemplateType::Email.as_str().to_string(), TemplateType::Email.label().to_string()),
        (TemplateType::Sms.as_str().to_string(), TemplateType::Sms.label().to_string()),
    ];
    if service.has_permission(TemplateType::Letter.as_str()) {
        choices.push((TemplateType::Letter.as_str().to_string(), TemplateType::Letter.label().to_string()));
    }
    if service.has_templates().await? || auth_user.user.services.len() > 1 {
        choices.push(("copy-existing".to_string(), "Copy an existing template".to_string()));
    }

    let page = CreateTemplatePage {
        flashes: flash.take_messages(),
        service_id: service.id().to_string(),
        back_url: urls::choose_template(service.id(), filter, folder_id),
        options: choices
            .into_iter()
            .map(|(value, label)| ChoiceOption {
                checked: value == selected,
                value,
                label,
                hint: String::new(),
            })
            .collect(),
        errors,
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

async fn create_template_page(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    flash: Flash,
    service_id: &str,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    state.drafts.delete(service_id, None).await?;
    let service = state.load_service(service_id).await?;
    render_create(auth_user, flash, &service, filter, folder_id, "", FormErrors::default()).await
}

async fn submit_create_template_form(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    filter: TemplateTypeFilter,
    folder_id: Option<&str>,
    form: CreateTemplateForm,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    state.drafts.delete(service_id, None).await?;
    let service = state.load_service(service_id).await?;

    if let Err(errors) = validator::Validate::validate(&form) {
        let errors = FormErrors::from(errors);
        return render_create(auth_user, flash, &service, filter, folder_id, &form.what_type, errors).await;
    }

    match add_template_by_type(state, auth_user, &service, &form.what_type, folder_id).await {
        Ok(Some(location)) => Ok((flash, Redirect::to(&location)).into_response()),
        Ok(None) => {
            let mut errors = FormErrors::default();
            errors.add("what_type", NOT_A_VALID_CHOICE);
            render_create(auth_user, flash, &service, filter, folder_id, &form.what_type, errors).await
        }
        Err(err) => {
            flash.error(api_error_message(err)?);
            render_create(auth_user, flash, &service, filter, folder_id, &form.what_type, FormErrors::default()).await
        }
    }
}

/// Where to go after choosing what kind of template to add. Letters are
/// created straight away.
async fn add_template_by_type(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service: &Service,
    what_type: &str,
    folder_id: Option<&str>,
) -> Result<Option<String>, crate::domain::errors::DomainError> {
    if what_type == "copy-existing" {
        return Ok(Some(urls::choose_template_to_copy(service.id(), None, None)));
    }
    let Ok(template_type) = what_type.parse::<TemplateType>() else {
        return Ok(None);
    };

    if template_type == TemplateType::Letter {
        let fields = TemplateDraftFields {
            name: "New letter template".to_string(),
            template_type,
            content: "Body".to_string(),
            subject: Some("Main heading".to_string()),
            process_type: Default::default(),
        };
        let blank_letter = state
            .apis
            .services
            .create_service_template(service.id(), &fields, folder_id, auth_user.id())
            .await?;
        metrics::counter!("templates_saved_total", "template_type" => "letter").increment(1);
        return Ok(Some(urls::view_template(service.id(), &blank_letter.id)));
    }

    if email_or_sms_not_enabled(template_type, service.permissions()) {
        return Ok(Some(urls::action_blocked(
            service.id(),
            template_type,
            "add_new_template",
            "0",
        )));
    }
    Ok(Some(urls::add_template_by_type(service.id(), template_type, folder_id)))
}

pub async fn create_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    flash: Flash,
) -> WebResult<Response> {
    create_template_page(&state, &auth_user, flash, &service_id, TemplateTypeFilter::All, None).await
}

pub async fn submit_create_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    flash: Flash,
    Form(form): Form<CreateTemplateForm>,
) -> WebResult<Response> {
    submit_create_template_form(&state, &auth_user, flash, &service_id, TemplateTypeFilter::All, None, form).await
}

pub async fn create_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    create_template_page(&state, &auth_user, flash, &service_id, TemplateTypeFilter::All, Some(&folder_id)).await
}

pub async fn submit_create_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    flash: Flash,
    Form(form): Form<CreateTemplateForm>,
) -> WebResult<Response> {
    submit_create_template_form(
        &state,
        &auth_user,
        flash,
        &service_id,
        TemplateTypeFilter::All,
        Some(&folder_id),
        form,
    )
    .await
}

pub async fn create_typed_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    create_template_page(&state, &auth_user, flash, &service_id, filter, None).await
}

pub async fn submit_create_typed_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment)): Path<(String, String)>,
    flash: Flash,
    Form(form): Form<CreateTemplateForm>,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    submit_create_template_form(&state, &auth_user, flash, &service_id, filter, None, form).await
}

pub async fn create_typed_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment, folder_id)): Path<(String, String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    create_template_page(&state, &auth_user, flash, &service_id, filter, Some(&folder_id)).await
}

pub async fn submit_create_typed_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment, folder_id)): Path<(String, String, String)>,
    flash: Flash,
    Form(form): Form<CreateTemplateForm>,
) -> WebResult<Response> {
    let filter = TemplateRef::filter(&segment)?;
    submit_create_template_form(&state, &auth_user, flash, &service_id, filter, Some(&folder_id), form).await
}

/// Prefilled template content from the template library.
pub async fn get_template_data(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> WebResult<Json<serde_json::Value>> {
    let data = state.apis.template_prefill.get_template(&template_id).await?;
    Ok(Json(json!({ "result": data })))
}
