use askama::Template as AskamaTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::Form;

use crate::application::models::Service;
use crate::domain::entities::{permissions, TemplateFolder, TemplateTypeFilter};
use crate::domain::errors::ApiClientError;
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebError, WebResult};
use crate::shared::flash::{DELETE, INFO};
use crate::shared::{Flash, FlashMessage};

use super::forms::{FormErrors, TemplateFolderForm};
use super::templates::{folder_crumbs, Crumb};
use super::{urls, HtmlTemplate};

const MUST_EMPTY_FOLDER: &str = "You must empty this folder before you can delete it";

#[derive(Debug, Clone)]
pub struct UserOption {
    pub id: String,
    pub name: String,
    pub checked: bool,
}

#[derive(AskamaTemplate)]
#[template(path = "manage_folder.html")]
struct ManageFolderPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    folder_name: String,
    crumbs: Vec<Crumb>,
    name: String,
    users: Vec<UserOption>,
    show_users: bool,
    errors: FormErrors,
    action_url: String,
    delete_url: String,
    back_url: String,
}

async fn folder_with_permission(
    auth_user: &AuthenticatedUser,
    service: &Service,
    folder_id: &str,
) -> WebResult<TemplateFolder> {
    service
        .get_template_folder_with_user_permission_or_403(Some(folder_id), &auth_user.user)
        .await?
        .ok_or_else(WebError::not_found)
}

async fn render_manage(
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service: &Service,
    folder: &TemplateFolder,
    form: &TemplateFolderForm,
    errors: FormErrors,
) -> WebResult<Response> {
    let path = service.catalog().await?.get_template_folder_path(Some(&folder.id))?;
    let users: Vec<UserOption> = service
        .active_users()
        .await?
        .iter()
        .filter(|user| user.id != auth_user.id())
        .map(|user| UserOption {
            checked: form.users_with_permission.contains(&user.id),
            id: user.id.clone(),
            name: if user.name.is_empty() {
                user.email_address.clone()
            } else {
                user.name.clone()
            },
        })
        .collect();

    let page = ManageFolderPage {
        flashes: flash.take_messages(),
        service_id: service.id().to_string(),
        folder_name: path
            .last()
            .map(|item| item.name.clone())
            .unwrap_or_else(|| folder.name.clone()),
        crumbs: folder_crumbs(service.id(), TemplateTypeFilter::All, &path),
        name: form.name.clone(),
        show_users: !users.is_empty(),
        users,
        errors,
        action_url: urls::manage_template_folder(service.id(), &folder.id),
        delete_url: urls::delete_template_folder(service.id(), &folder.id),
        back_url: urls::choose_template(service.id(), TemplateTypeFilter::All, Some(&folder.id)),
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

fn form_for(folder: &TemplateFolder) -> TemplateFolderForm {
    TemplateFolderForm {
        name: folder.name.clone(),
        users_with_permission: folder.users_with_permission.clone(),
    }
}

pub async fn manage_template_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let folder = folder_with_permission(&auth_user, &service, &folder_id).await?;
    render_manage(&auth_user, flash, &service, &folder, &form_for(&folder), FormErrors::default()).await
}

pub async fn submit_manage_template_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    flash: Flash,
    Form(form): Form<TemplateFolderForm>,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let folder = folder_with_permission(&auth_user, &service, &folder_id).await?;

    if let Err(errors) = form.validate_form() {
        return render_manage(&auth_user, flash, &service, &folder, &form, errors).await;
    }

    let has_other_users = service
        .active_users()
        .await?
        .iter()
        .any(|user| user.id != auth_user.id());
    let users_with_permission = if auth_user
        .user
        .has_permissions(&service_id, &[permissions::MANAGE_SERVICE], false)
        && has_other_users
    {
        let mut users = form.users_with_permission.clone();
        users.push(auth_user.id().to_string());
        Some(users)
    } else {
        None
    };

    state
        .apis
        .template_folders
        .update_template_folder(&service_id, &folder_id, form.name.trim(), users_with_permission)
        .await?;
    tracing::info!("Updated template folder {} in service {}", folder_id, service_id);

    let location = urls::choose_template(&service_id, TemplateTypeFilter::All, Some(&folder_id));
    Ok((flash, Redirect::to(&location)).into_response())
}

async fn folder_is_empty(service: &Service, folder_id: &str) -> WebResult<bool> {
    Ok(service
        .catalog()
        .await?
        .get_template_folders_and_templates(TemplateTypeFilter::All, Some(folder_id))
        .is_empty())
}

fn back_to_folder(mut flash: Flash, service_id: &str, folder_id: &str) -> Response {
    flash.push(INFO, MUST_EMPTY_FOLDER);
    let location = urls::choose_template(service_id, TemplateTypeFilter::All, Some(folder_id));
    (flash, Redirect::to(&location)).into_response()
}

pub async fn confirm_delete_template_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    mut flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let folder = folder_with_permission(&auth_user, &service, &folder_id).await?;

    if !folder_is_empty(&service, &folder_id).await? {
        return Ok(back_to_folder(flash, &service_id, &folder_id));
    }

    flash.push(
        DELETE,
        format!("Are you sure you want to delete the ‘{}’ folder?", folder.name),
    );
    render_manage(&auth_user, flash, &service, &folder, &form_for(&folder), FormErrors::default()).await
}

pub async fn delete_template_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, folder_id)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    auth_user.require_permissions(&service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let service = state.load_service(&service_id).await?;
    let folder = folder_with_permission(&auth_user, &service, &folder_id).await?;

    if !folder_is_empty(&service, &folder_id).await? {
        return Ok(back_to_folder(flash, &service_id, &folder_id));
    }

    match state
        .apis
        .template_folders
        .delete_template_folder(&service_id, &folder_id)
        .await
    {
        Ok(()) => {
            tracing::info!("Deleted template folder {} in service {}", folder_id, service_id);
            let location = urls::choose_template(&service_id, TemplateTypeFilter::All, folder.parent_id.as_deref());
            Ok((flash, Redirect::to(&location)).into_response())
        }
        Err(ApiClientError::Http { status: 400, message }) if message.contains("Folder is not empty") => {
            Ok(back_to_folder(flash, &service_id, &folder_id))
        }
        Err(err) => Err(WebError::Internal(err.to_string())),
    }
}
