use askama::Template as AskamaTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;
use chrono::{DateTime, NaiveDateTime, Utc};

use crate::domain::entities::{permissions, Postage, TemplateType, TemplateTypeFilter};
use crate::domain::services::human_readable_delta;
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebError, WebResult};
use crate::shared::flash::{DEFAULT_WITH_TICK, DELETE};
use crate::shared::{Flash, FlashMessage};

use super::forms::{FormErrors, LetterTemplatePostageForm, SetTemplateSenderForm};
use super::templates::{render_template_page, ChoiceOption, LetterPreviewUrls, TemplateLinks, TemplateView};
use super::{letters, urls, HtmlTemplate, VersionRef};

/// Timestamps from the API, with or without an offset.
pub fn parse_api_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

fn last_used_message(created_at: Option<&str>, now: DateTime<Utc>) -> String {
    let last_used = created_at
        .and_then(parse_api_timestamp)
        .map(|created| human_readable_delta(now - created))
        .unwrap_or_else(|| "more than seven days".to_string());
    format!("This template was last used {} ago.", last_used)
}

pub async fn confirm_delete_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(&template_id, &auth_user.user)
        .await?;

    let detail = match state
        .apis
        .template_statistics
        .get_template_statistics_for_template(&service_id, &template.id)
        .await
    {
        Ok(last_used) => last_used_message(last_used.as_ref().map(|l| l.created_at.as_str()), Utc::now()),
        Err(err) if err.is_not_found() => String::new(),
        Err(err) => return Err(err.into()),
    };

    flash.push_with_detail(
        DELETE,
        format!("Are you sure you want to delete ‘{}’?", template.name),
        detail,
    );
    let page = render_template_page(&state, &auth_user, &mut flash, &service, &template, true, false).await?;
    Ok((flash, page).into_response())
}

pub async fn delete_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(&template_id, &auth_user.user)
        .await?;

    state
        .apis
        .services
        .delete_service_template(&service_id, &template_id, auth_user.id())
        .await?;
    tracing::info!("Archived template {} in service {}", template_id, service_id);

    let location = urls::choose_template(&service_id, TemplateTypeFilter::All, template.folder.as_deref());
    Ok((flash, Redirect::to(&location)).into_response())
}

pub async fn confirm_redact_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(&template_id, &auth_user.user)
        .await?;

    let page = render_template_page(&state, &auth_user, &mut flash, &service, &template, true, true).await?;
    Ok((flash, page).into_response())
}

pub async fn redact_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    state
        .apis
        .services
        .redact_service_template(&service_id, &template_id, auth_user.id())
        .await?;

    flash.push(
        DEFAULT_WITH_TICK,
        "Personalised content will be hidden for messages sent with this template",
    );
    Ok((flash, Redirect::to(&urls::view_template(&service_id, &template_id))).into_response())
}

#[derive(AskamaTemplate)]
#[template(path = "template_history.html")]
struct TemplateHistoryPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template: TemplateView,
    back_url: String,
}

/// `/templates/{template_id}/version/{n}` and `/version/{n}.{pdf|png}`.
pub async fn view_template_version(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id, version)): Path<(String, String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    let version = VersionRef::parse(&version)?;
    if let Some(filetype) = version.filetype {
        return letters::view_template_version_preview(
            &state,
            &auth_user,
            &service_id,
            &template_id,
            version.version,
            filetype,
        )
        .await;
    }

    auth_user.require_permissions(&service_id, &[], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service.get_template(&template_id, Some(version.version)).await?;

    let page = TemplateHistoryPage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        template: TemplateView::build(&state, &service, &template, LetterPreviewUrls::Version(version.version))
            .await?,
        back_url: urls::view_template_versions(&service_id, &template_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

#[derive(AskamaTemplate)]
#[template(path = "choose_history.html")]
struct ChooseHistoryPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    /// Newest first, each with the link to its own page.
    versions: Vec<(TemplateView, String)>,
    back_url: String,
}

pub async fn view_template_versions(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::VIEW_ACTIVITY], false)?;
    let service = state.load_service(&service_id).await?;
    let history = state
        .apis
        .services
        .get_service_template_versions(&service_id, &template_id)
        .await?;

    let mut versions = Vec::with_capacity(history.len());
    for template in &history {
        let version = template.version.unwrap_or(1);
        versions.push((
            TemplateView::build(&state, &service, template, LetterPreviewUrls::Version(version)).await?,
            urls::view_template_version(&service_id, &template_id, version),
        ));
    }

    let page = ChooseHistoryPage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        versions,
        back_url: urls::view_template(&service_id, &template_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

#[derive(AskamaTemplate)]
#[template(path = "set_template_sender.html")]
struct SetTemplateSenderPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template_name: String,
    options: Vec<ChoiceOption>,
    no_senders: bool,
    errors: FormErrors,
    links: TemplateLinks,
}

struct SenderChoices {
    options: Vec<(String, String)>,
    default_sender: String,
    no_senders: bool,
}

impl SenderChoices {
    fn valid_ids(&self) -> Vec<String> {
        self.options.iter().map(|(id, _)| id.clone()).collect()
    }

    fn to_options(&self, selected: &str) -> Vec<ChoiceOption> {
        self.options
            .iter()
            .map(|(value, label)| ChoiceOption {
                value: value.clone(),
                label: label.clone(),
                hint: if *value == self.default_sender {
                    "(Default)".to_string()
                } else {
                    String::new()
                },
                checked: value == selected,
            })
            .collect()
    }
}

async fn sender_choices(
    service: &crate::application::models::Service,
    template_type: TemplateType,
) -> WebResult<SenderChoices> {
    let senders = service.sender_details(template_type).await?;
    let default_sender = senders
        .iter()
        .find(|sender| sender.is_default)
        .map(|sender| sender.id.clone())
        .unwrap_or_else(|| "Not set".to_string());

    let mut options = vec![(String::new(), "Blank".to_string())];
    options.extend(senders.iter().map(|sender| (sender.id.clone(), sender.label.clone())));
    Ok(SenderChoices {
        options,
        default_sender,
        no_senders: senders.is_empty(),
    })
}

pub async fn set_template_sender(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(&template_id, &auth_user.user)
        .await?;
    let choices = sender_choices(&service, template.template_type).await?;
    let current_choice = template.service_letter_contact.clone().unwrap_or_default();

    let page = SetTemplateSenderPage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        template_name: template.name.clone(),
        options: choices.to_options(&current_choice),
        no_senders: choices.no_senders,
        errors: FormErrors::default(),
        links: TemplateLinks::new(&service_id, &template_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

pub async fn submit_template_sender(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
    Form(form): Form<SetTemplateSenderForm>,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(&template_id, &auth_user.user)
        .await?;
    let choices = sender_choices(&service, template.template_type).await?;

    match form.validate_sender(&choices.valid_ids()) {
        Ok(sender) => {
            state
                .apis
                .services
                .update_service_template_sender(&service_id, &template_id, sender.as_deref(), auth_user.id())
                .await?;
            Ok((flash, Redirect::to(&urls::view_template(&service_id, &template_id))).into_response())
        }
        Err(errors) => {
            let page = SetTemplateSenderPage {
                flashes: flash.take_messages(),
                service_id: service_id.clone(),
                template_name: template.name.clone(),
                options: choices.to_options(&form.sender),
                no_senders: choices.no_senders,
                errors,
                links: TemplateLinks::new(&service_id, &template_id),
            };
            Ok((flash, HtmlTemplate(page)).into_response())
        }
    }
}

#[derive(AskamaTemplate)]
#[template(path = "edit_postage.html")]
struct EditPostagePage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template_name: String,
    options: Vec<ChoiceOption>,
    errors: FormErrors,
    links: TemplateLinks,
}

fn postage_options(selected: &str) -> Vec<ChoiceOption> {
    [Postage::First, Postage::Second]
        .iter()
        .map(|postage| ChoiceOption {
            value: postage.as_str().to_string(),
            label: postage.label().to_string(),
            hint: String::new(),
            checked: postage.as_str() == selected,
        })
        .collect()
}

async fn letter_template(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service_id: &str,
    template_id: &str,
) -> WebResult<crate::domain::entities::Template> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(service_id).await?;
    let template = service
        .get_template_with_user_permission_or_403(template_id, &auth_user.user)
        .await?;
    if template.template_type != TemplateType::Letter {
        return Err(WebError::not_found());
    }
    Ok(template)
}

pub async fn edit_template_postage(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    let template = letter_template(&state, &auth_user, &service_id, &template_id).await?;
    let current = template.postage.map(|p| p.as_str()).unwrap_or_default();

    let page = EditPostagePage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        template_name: template.name.clone(),
        options: postage_options(current),
        errors: FormErrors::default(),
        links: TemplateLinks::new(&service_id, &template_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

pub async fn submit_template_postage(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    mut flash: Flash,
    Form(form): Form<LetterTemplatePostageForm>,
) -> WebResult<Response> {
    let template = letter_template(&state, &auth_user, &service_id, &template_id).await?;

    match form.validate_postage() {
        Ok(postage) => {
            state
                .apis
                .services
                .update_service_template_postage(&service_id, &template_id, postage, auth_user.id())
                .await?;
            Ok((flash, Redirect::to(&urls::view_template(&service_id, &template_id))).into_response())
        }
        Err(errors) => {
            let page = EditPostagePage {
                flashes: flash.take_messages(),
                service_id: service_id.clone(),
                template_name: template.name.clone(),
                options: postage_options(&form.postage),
                errors,
                links: TemplateLinks::new(&service_id, &template_id),
            };
            Ok((flash, HtmlTemplate(page)).into_response())
        }
    }
}

#[derive(AskamaTemplate)]
#[template(path = "action_blocked.html")]
struct ActionBlockedPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    notification_type: String,
    return_url: String,
    settings_url: String,
}

fn notification_type_label(notification_type: &str) -> String {
    match notification_type {
        "sms" => "text messages".to_string(),
        "email" => "emails".to_string(),
        other => other.to_string(),
    }
}

fn action_blocked_return_url(service_id: &str, return_to: &str, template_id: &str) -> String {
    match return_to {
        "add_new_template" => urls::create_template(service_id, TemplateTypeFilter::All, None),
        "view_template" => urls::view_template(service_id, template_id),
        _ => urls::choose_template(service_id, TemplateTypeFilter::All, None),
    }
}

pub async fn action_blocked(
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, notification_type, return_to, template_id)): Path<(String, String, String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;

    let page = ActionBlockedPage {
        flashes: flash.take_messages(),
        service_id: service_id.clone(),
        notification_type: notification_type_label(&notification_type),
        return_url: action_blocked_return_url(&service_id, &return_to, &template_id),
        settings_url: urls::service_settings(&service_id),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}
