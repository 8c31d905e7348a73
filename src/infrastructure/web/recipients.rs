use askama::Template as AskamaTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{cookie::CookieJar, Form};

use crate::domain::entities::{permissions, Template, TemplateType};
use crate::domain::services::{EMAIL_ADDRESS_HEADING, PHONE_NUMBER_HEADING};
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebResult};
use crate::shared::cookies::{one_off_cookie, OneOffSession};
use crate::shared::{Flash, FlashMessage};

use super::forms::{AddRecipientsForm, FormErrors, RecipientChoice};
use super::templates::ChoiceOption;
use super::{urls, HtmlTemplate};

#[derive(AskamaTemplate)]
#[template(path = "add_recipients.html")]
struct AddRecipientsPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    template_name: String,
    options: Vec<ChoiceOption>,
    placeholder_label: String,
    placeholder_value: String,
    errors: FormErrors,
    back_url: String,
}

fn recipient_options(template_type: TemplateType, selected: &str) -> Vec<ChoiceOption> {
    let (many_hint, one_hint) = if template_type == TemplateType::Email {
        (
            "Upload or create a spreadsheet. GC Notify can create columns with headings for the email address and any other variables.",
            "Enter their email address.",
        )
    } else {
        (
            "Upload or create a spreadsheet. GC Notify can create columns with headings for the phone numbers and any other variables.",
            "Enter their phone number.",
        )
    };
    [
        ("many_recipients", "Many recipients", many_hint),
        ("one_recipient", "One recipient", one_hint),
    ]
    .iter()
    .map(|(value, label, hint)| ChoiceOption {
        value: value.to_string(),
        label: label.to_string(),
        hint: hint.to_string(),
        checked: *value == selected,
    })
    .collect()
}

fn recipient_heading(template_type: TemplateType) -> &'static str {
    if template_type == TemplateType::Email {
        EMAIL_ADDRESS_HEADING
    } else {
        PHONE_NUMBER_HEADING
    }
}

fn render_add_recipients(
    mut flash: Flash,
    service_id: &str,
    template: &Template,
    form: &AddRecipientsForm,
    errors: FormErrors,
) -> Response {
    let heading = recipient_heading(template.template_type);
    let mut placeholder_label = heading.to_string();
    if let Some(first) = placeholder_label.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    let page = AddRecipientsPage {
        flashes: flash.take_messages(),
        service_id: service_id.to_string(),
        template_name: template.name.clone(),
        options: recipient_options(template.template_type, &form.what_type),
        placeholder_label,
        placeholder_value: form.placeholder_value.clone(),
        errors,
        back_url: urls::view_template(service_id, &template.id),
    };
    (flash, HtmlTemplate(page)).into_response()
}

async fn template_to_send(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service_id: &str,
    template_id: &str,
) -> WebResult<Template> {
    auth_user.require_permissions(service_id, &[permissions::SEND_MESSAGES], true)?;
    let service = state.load_service(service_id).await?;
    Ok(service
        .get_template_with_user_permission_or_403(template_id, &auth_user.user)
        .await?)
}

pub async fn add_recipients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    let template = template_to_send(&state, &auth_user, &service_id, &template_id).await?;
    Ok(render_add_recipients(
        flash,
        &service_id,
        &template,
        &AddRecipientsForm::default(),
        FormErrors::default(),
    ))
}

pub async fn submit_add_recipients(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    jar: CookieJar,
    flash: Flash,
    Form(form): Form<AddRecipientsForm>,
) -> WebResult<Response> {
    let template = template_to_send(&state, &auth_user, &service_id, &template_id).await?;

    match form.validate_for(template.template_type) {
        Ok(RecipientChoice::ManyRecipients) => {
            Ok((flash, Redirect::to(&urls::send_messages(&service_id, &template_id))).into_response())
        }
        Ok(RecipientChoice::OneRecipient) => {
            let recipient = form.placeholder_value.trim().to_string();
            let mut session = OneOffSession {
                recipient: Some(recipient.clone()),
                ..Default::default()
            };
            session
                .placeholders
                .insert(recipient_heading(template.template_type).to_string(), recipient);

            let jar = match one_off_cookie(&session) {
                Some(cookie) => jar.add(cookie),
                None => jar,
            };
            let location = urls::send_one_off_step(&service_id, &template_id, 1);
            Ok((jar, flash, Redirect::to(&location)).into_response())
        }
        Err(errors) => Ok(render_add_recipients(flash, &service_id, &template, &form, errors)),
    }
}
