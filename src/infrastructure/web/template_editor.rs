use askama::Template as AskamaTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;

use crate::application::models::Service;
use crate::domain::entities::{
    permissions, PreviewDraft, ProcessType, Template, TemplateDraftFields, TemplateType,
};
use crate::domain::services::{
    column_letters, email_or_sms_not_enabled, example_column_headings, example_csv_row,
    should_skip_template_page, TemplateBody,
};
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebError, WebResult};
use crate::shared::flash::DEFAULT_WITH_TICK;
use crate::shared::{Flash, FlashMessage};

use super::forms::{FormErrors, PreviewTemplateForm, TemplateForm};
use super::templates::{LetterPreviewUrls, TemplateView};
use super::{urls, HtmlTemplate};

const PROCESS_TYPES: [ProcessType; 3] = [ProcessType::Bulk, ProcessType::Normal, ProcessType::Priority];

/// Form values as strings, ready for the page.
#[derive(Debug, Clone, Default)]
pub struct TemplateFormView {
    pub name: String,
    pub subject: String,
    pub template_content: String,
    pub process_type: String,
}

impl From<&TemplateForm> for TemplateFormView {
    fn from(form: &TemplateForm) -> Self {
        Self {
            name: form.name.clone(),
            subject: form.subject.clone().unwrap_or_default(),
            template_content: form.template_content.clone(),
            process_type: form
                .parsed_process_type()
                .unwrap_or_default()
                .as_str()
                .to_string(),
        }
    }
}

#[derive(AskamaTemplate)]
#[template(path = "edit_template.html")]
struct EditTemplatePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    heading: String,
    template_type: String,
    type_label: String,
    has_subject: bool,
    is_letter: bool,
    form: TemplateFormView,
    errors: FormErrors,
    show_process_type: bool,
    process_types: Vec<String>,
    action_url: String,
    back_url: String,
}

struct EditorContext<'a> {
    service_id: &'a str,
    heading: &'static str,
    template_type: TemplateType,
    action_url: String,
    back_url: String,
}

fn render_editor(
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    context: EditorContext<'_>,
    form: &TemplateForm,
    errors: FormErrors,
) -> Response {
    let page = EditTemplatePage {
        flashes: flash.take_messages(),
        service_id: context.service_id.to_string(),
        heading: context.heading.to_string(),
        template_type: context.template_type.as_str().to_string(),
        type_label: context.template_type.label().to_string(),
        has_subject: context.template_type.has_subject(),
        is_letter: context.template_type == TemplateType::Letter,
        form: TemplateFormView::from(form),
        errors,
        show_process_type: auth_user.is_platform_admin(),
        process_types: PROCESS_TYPES.iter().map(|p| p.as_str().to_string()).collect(),
        action_url: context.action_url,
        back_url: context.back_url,
    };
    (flash, HtmlTemplate(page)).into_response()
}

fn form_from_draft(draft: &PreviewDraft) -> TemplateForm {
    TemplateForm {
        name: draft.name.clone(),
        subject: draft.subject.clone(),
        template_content: draft
            .template_content
            .clone()
            .unwrap_or_else(|| draft.content.clone()),
        process_type: Some(draft.process_type.unwrap_or_default().as_str().to_string()),
        ..Default::default()
    }
}

fn form_from_template(template: &Template) -> TemplateForm {
    TemplateForm {
        name: template.name.clone(),
        subject: template.subject.clone(),
        template_content: template.content.clone(),
        process_type: Some(template.process_type_or_default().as_str().to_string()),
        ..Default::default()
    }
}

fn draft_fields(form: &TemplateForm, template_type: TemplateType, process_type: ProcessType) -> TemplateDraftFields {
    TemplateDraftFields {
        name: form.name.trim().to_string(),
        template_type,
        content: form.template_content.clone(),
        subject: form.subject_for(template_type),
        process_type,
    }
}

/// A saved or unsaved template rebuilt from its draft, for previewing.
pub fn template_from_draft(draft: &PreviewDraft, service_id: &str) -> Option<Template> {
    Some(Template {
        id: draft.id.clone().unwrap_or_default(),
        name: draft.name.clone(),
        template_type: draft.template_type?,
        content: draft.content.clone(),
        subject: draft.subject.clone(),
        process_type: draft.process_type,
        service: Some(service_id.to_string()),
        folder: draft.folder.clone(),
        postage: None,
        reply_to: None,
        reply_to_text: draft.reply_to_text.clone(),
        service_letter_contact: None,
        version: None,
        created_at: None,
        updated_at: None,
        archived: false,
        redact_personalisation: false,
    })
}

fn record_saved(service_id: &str, template: &Template) {
    tracing::info!(
        "Saved {} template {} in service {}",
        template.template_type,
        template.id,
        service_id
    );
    metrics::counter!("templates_saved_total", "template_type" => template.template_type.as_str()).increment(1);
}

fn parse_add_type(service: &Service, template_type: &str) -> WebResult<TemplateType> {
    let template_type: TemplateType = template_type.parse().map_err(WebError::NotFound)?;
    if template_type == TemplateType::Letter && !service.has_permission(TemplateType::Letter.as_str()) {
        return Err(WebError::Forbidden(format!(
            "Service {} cannot send letters",
            service.id()
        )));
    }
    Ok(template_type)
}

fn add_context<'a>(service_id: &'a str, template_type: TemplateType, folder_id: Option<&str>) -> EditorContext<'a> {
    EditorContext {
        service_id,
        heading: "Create reusable template",
        template_type,
        action_url: urls::add_template_by_type(service_id, template_type, folder_id),
        back_url: urls::create_template(service_id, Default::default(), folder_id),
    }
}

/// GET `/templates[/folders/{folder_id}]/add-{template_type}`.
pub async fn show_add_template(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    flash: Flash,
    service_id: &str,
    template_type: &str,
    folder_id: Option<&str>,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(service_id).await?;
    let template_type = parse_add_type(&service, template_type)?;
    let form = form_from_draft(&state.drafts.get(service_id, None).await);

    finish_add(auth_user, flash, &service, template_type, folder_id, &form, FormErrors::default())
}

fn finish_add(
    auth_user: &AuthenticatedUser,
    flash: Flash,
    service: &Service,
    template_type: TemplateType,
    folder_id: Option<&str>,
    form: &TemplateForm,
    errors: FormErrors,
) -> WebResult<Response> {
    if email_or_sms_not_enabled(template_type, service.permissions()) {
        return Ok((
            flash,
            Redirect::to(&urls::action_blocked(service.id(), template_type, "templates", "0")),
        )
            .into_response());
    }
    Ok(render_editor(
        auth_user,
        flash,
        add_context(service.id(), template_type, folder_id),
        form,
        errors,
    ))
}

/// POST `/templates[/folders/{folder_id}]/add-{template_type}`.
pub async fn submit_add_template(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    template_type: &str,
    folder_id: Option<&str>,
    form: TemplateForm,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(service_id).await?;
    let template_type = parse_add_type(&service, template_type)?;

    if let Err(errors) = form.validate_for(template_type) {
        return finish_add(auth_user, flash, &service, template_type, folder_id, &form, errors);
    }

    let process_type = form.parsed_process_type().unwrap_or_default();
    if process_type != ProcessType::Normal {
        auth_user.require_platform_admin()?;
    }

    if form.is_preview() {
        let draft = PreviewDraft {
            id: None,
            name: form.name.clone(),
            content: form.template_content.clone(),
            template_content: Some(form.template_content.clone()),
            subject: form.subject_for(template_type),
            template_type: Some(template_type),
            process_type: Some(process_type),
            folder: folder_id.map(str::to_string),
            reply_to_text: None,
        };
        state.drafts.set(service_id, None, &draft).await?;
        return Ok((flash, Redirect::to(&urls::preview_template(service_id, None))).into_response());
    }

    let fields = draft_fields(&form, template_type, process_type);
    match state
        .apis
        .services
        .create_service_template(service_id, &fields, folder_id, auth_user.id())
        .await
    {
        Ok(new_template) => {
            record_saved(service_id, &new_template);
            flash.push(DEFAULT_WITH_TICK, format!("'{}' template saved", fields.name));
            Ok((flash, Redirect::to(&urls::view_template(service_id, &new_template.id))).into_response())
        }
        Err(err) if err.is_content_too_long() => {
            let mut errors = FormErrors::default();
            errors.extend_field("template_content", err.field_messages("content"));
            finish_add(auth_user, flash, &service, template_type, folder_id, &form, errors)
        }
        Err(err) => Err(err.into()),
    }
}

/// `/templates/folders/{folder_id}/add-{template_type}`.
pub async fn add_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id, segment)): Path<(String, String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    let template_type = segment.strip_prefix("add-").ok_or_else(WebError::not_found)?;
    show_add_template(&state, &auth_user, flash, &service_id, template_type, Some(&folder_id)).await
}

pub async fn submit_add_template_in_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id, segment)): Path<(String, String, String)>,
    flash: Flash,
    Form(form): Form<TemplateForm>,
) -> WebResult<Response> {
    let template_type = segment.strip_prefix("add-").ok_or_else(WebError::not_found)?;
    submit_add_template(&state, &auth_user, flash, &service_id, template_type, Some(&folder_id), form).await
}

/// The create form prefilled from another template, posting back to the
/// copy URL.
pub fn render_copy_form(
    auth_user: &AuthenticatedUser,
    flash: Flash,
    service_id: &str,
    template: &Template,
    name: String,
    action_url: String,
    back_url: String,
) -> Response {
    let form = TemplateForm {
        name,
        ..form_from_template(template)
    };
    let heading = if template.template_type == TemplateType::Email {
        "Copy email template"
    } else {
        "Copy text message template"
    };
    render_editor(
        auth_user,
        flash,
        EditorContext {
            service_id,
            heading,
            template_type: template.template_type,
            action_url,
            back_url,
        },
        &form,
        FormErrors::default(),
    )
}

fn edit_context<'a>(service_id: &'a str, template: &Template) -> EditorContext<'a> {
    EditorContext {
        service_id,
        heading: "Edit reusable template",
        template_type: template.template_type,
        action_url: urls::edit_template(service_id, &template.id),
        back_url: urls::view_template(service_id, &template.id),
    }
}

/// The saved template with any unsaved draft laid over it.
async fn template_for_editing(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service: &Service,
    template_id: &str,
) -> WebResult<Template> {
    let mut template = service
        .get_template_with_user_permission_or_403(template_id, &auth_user.user)
        .await?;
    let draft = state.drafts.get(service.id(), Some(template_id)).await;
    if !draft.content.is_empty() {
        template.content = draft.content;
        template.name = draft.name;
        template.subject = draft.subject;
    }
    Ok(template)
}

fn finish_edit(
    auth_user: &AuthenticatedUser,
    flash: Flash,
    service: &Service,
    template: &Template,
    form: &TemplateForm,
    errors: FormErrors,
) -> WebResult<Response> {
    if email_or_sms_not_enabled(template.template_type, service.permissions()) {
        return Ok((
            flash,
            Redirect::to(&urls::action_blocked(
                service.id(),
                template.template_type,
                "view_template",
                &template.id,
            )),
        )
            .into_response());
    }
    Ok(render_editor(
        auth_user,
        flash,
        edit_context(service.id(), template),
        form,
        errors,
    ))
}

pub async fn edit_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = template_for_editing(&state, &auth_user, &service, &template_id).await?;
    let form = form_from_template(&template);
    finish_edit(&auth_user, flash, &service, &template, &form, FormErrors::default())
}

#[derive(AskamaTemplate)]
#[template(path = "breaking_change.html")]
struct BreakingChangePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template_name: String,
    placeholders_added: Vec<String>,
    placeholders_removed: Vec<String>,
    column_headings: Vec<String>,
    example_rows: Vec<Vec<String>>,
    form: TemplateFormView,
    has_subject: bool,
    action_url: String,
    back_url: String,
}

pub async fn submit_edit_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
    Form(form): Form<TemplateForm>,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = template_for_editing(&state, &auth_user, &service, &template_id).await?;
    let template_type = template.template_type;

    if let Err(errors) = form.validate_for(template_type) {
        return finish_edit(&auth_user, flash, &service, &template, &form, errors);
    }

    let process_type = form.parsed_process_type().unwrap_or_default();
    if process_type != template.process_type_or_default() {
        auth_user.require_platform_admin()?;
    }

    let draft = PreviewDraft {
        id: Some(template.id.clone()),
        name: form.name.clone(),
        content: form.template_content.clone(),
        template_content: None,
        subject: form.subject_for(template_type),
        template_type: Some(template_type),
        process_type: Some(process_type),
        folder: template.folder.clone(),
        reply_to_text: template.reply_to_text.clone(),
    };
    state.drafts.set(&service_id, Some(&template_id), &draft).await?;

    let new_body = TemplateBody::from_draft(template_type, &draft);
    let template_change = TemplateBody::from(&template).compare_to(&new_body);
    if !template_change.placeholders_added.is_empty() && !form.is_confirmed() {
        let placeholders = new_body.placeholders();
        let headings = example_column_headings(template_type, &placeholders);
        let row = example_csv_row(template_type, &placeholders);
        let page = BreakingChangePage {
            flashes: flash.take_messages(),
            service_id: service_id.clone(),
            template_name: template.name.clone(),
            placeholders_added: template_change.placeholders_added,
            placeholders_removed: template_change.placeholders_removed,
            column_headings: column_letters(headings.len()),
            example_rows: vec![headings, row.clone(), row],
            form: TemplateFormView::from(&form),
            has_subject: template_type.has_subject(),
            action_url: urls::edit_template(&service_id, &template_id),
            back_url: urls::edit_template(&service_id, &template_id),
        };
        return Ok((flash, HtmlTemplate(page)).into_response());
    }

    if form.is_preview() {
        return Ok((flash, Redirect::to(&urls::preview_template(&service_id, Some(&template_id)))).into_response());
    }

    let fields = draft_fields(&form, template_type, process_type);
    match state
        .apis
        .services
        .update_service_template(&service_id, &template_id, &fields, auth_user.id())
        .await
    {
        Ok(saved) => {
            record_saved(&service_id, &saved);
            flash.push(DEFAULT_WITH_TICK, format!("'{}' template saved", fields.name));
            Ok((flash, Redirect::to(&urls::view_template(&service_id, &template_id))).into_response())
        }
        Err(err) if err.is_content_too_long() => {
            let mut errors = FormErrors::default();
            errors.extend_field("template_content", err.field_messages("content"));
            finish_edit(&auth_user, flash, &service, &template, &form, errors)
        }
        Err(err) => Err(err.into()),
    }
}

#[derive(AskamaTemplate)]
#[template(path = "preview_template.html")]
struct PreviewTemplatePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template: TemplateView,
    action_url: String,
    back_url: String,
}

fn back_link(service_id: &str, draft: &PreviewDraft, template_type: TemplateType) -> String {
    match draft.id.as_deref() {
        Some(id) => urls::edit_template(service_id, id),
        None => urls::add_template_by_type(service_id, template_type, draft.folder.as_deref()),
    }
}

async fn show_preview(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    template_id: Option<&str>,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    let draft = state.drafts.get(service_id, template_id).await;
    let Some(template) = template_from_draft(&draft, service_id) else {
        return Ok((flash, Redirect::to(&expired_draft_redirect(service_id, template_id))).into_response());
    };

    if let Some(id) = draft.id.as_deref() {
        if should_skip_template_page(&auth_user.user, service_id, template.template_type) {
            return Ok((flash, Redirect::to(&urls::send_one_off(service_id, id))).into_response());
        }
    }

    let service = state.load_service(service_id).await?;
    let letter_urls = if draft.id.is_some() {
        LetterPreviewUrls::Current
    } else {
        LetterPreviewUrls::Hidden
    };
    let page = PreviewTemplatePage {
        flashes: flash.take_messages(),
        service_id: service_id.to_string(),
        template: TemplateView::build(state, &service, &template, letter_urls).await?,
        action_url: urls::preview_template(service_id, template_id),
        back_url: back_link(service_id, &draft, template.template_type),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

/// Without a draft there is nothing to preview.
fn expired_draft_redirect(service_id: &str, template_id: Option<&str>) -> String {
    match template_id {
        Some(id) => urls::edit_template(service_id, id),
        None => urls::choose_template(service_id, Default::default(), None),
    }
}

async fn submit_preview(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    template_id: Option<&str>,
    form: PreviewTemplateForm,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    let draft = state.drafts.get(service_id, template_id).await;
    let Some(template_type) = draft.template_type else {
        return Ok((flash, Redirect::to(&expired_draft_redirect(service_id, template_id))).into_response());
    };

    if form.is_edit() {
        return Ok((flash, Redirect::to(&back_link(service_id, &draft, template_type))).into_response());
    }

    let fields = TemplateDraftFields {
        name: draft.name.clone(),
        template_type,
        content: draft.content.clone(),
        subject: draft.subject.clone(),
        process_type: draft.process_type.unwrap_or_default(),
    };
    let saved = match draft.id.as_deref() {
        Some(id) => {
            state
                .apis
                .services
                .update_service_template(service_id, id, &fields, auth_user.id())
                .await
        }
        None => {
            state
                .apis
                .services
                .create_service_template(service_id, &fields, draft.folder.as_deref(), auth_user.id())
                .await
        }
    };

    match saved {
        Ok(saved) => {
            record_saved(service_id, &saved);
            flash.push(DEFAULT_WITH_TICK, format!("'{}' template saved", draft.name));
            let saved_id = draft.id.clone().unwrap_or(saved.id);
            Ok((flash, Redirect::to(&urls::view_template(service_id, &saved_id))).into_response())
        }
        Err(err) if err.is_content_too_long() => {
            for message in err.field_messages("content") {
                flash.error(message);
            }
            show_preview(state, auth_user, flash, service_id, template_id).await
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn preview_new_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    flash: Flash,
) -> WebResult<Response> {
    show_preview(&state, &auth_user, flash, &service_id, None).await
}

pub async fn submit_preview_new_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    flash: Flash,
    Form(form): Form<PreviewTemplateForm>,
) -> WebResult<Response> {
    submit_preview(&state, &auth_user, flash, &service_id, None, form).await
}

pub async fn preview_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    show_preview(&state, &auth_user, flash, &service_id, Some(&template_id)).await
}

pub async fn submit_preview_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    flash: Flash,
    Form(form): Form<PreviewTemplateForm>,
) -> WebResult<Response> {
    submit_preview(&state, &auth_user, flash, &service_id, Some(&template_id), form).await
}
