use askama::Template as AskamaTemplate;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::Deserialize;

use crate::application::models::{TemplateList, TemplateListItem, TemplateLists};
use crate::domain::entities::{permissions, TemplateType, TemplateTypeFilter};
use crate::domain::services::template_copy_name;
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebError, WebResult};
use crate::shared::{Flash, FlashMessage};

use super::forms::TemplateForm;
use super::templates::{Crumb, ListRow};
use super::{template_editor, urls, HtmlTemplate, TemplateRef};

#[derive(AskamaTemplate)]
#[template(path = "copy.html")]
struct CopyPage {
    flashes: Vec<FlashMessage>,
    service_id: String,
    from_service_name: String,
    crumbs: Vec<Crumb>,
    rows: Vec<ListRow>,
    templates_to_show: bool,
    back_url: String,
}

fn copy_rows(service_id: &str, items: &[TemplateListItem]) -> Vec<ListRow> {
    items
        .iter()
        .map(|item| {
            let url = if item.is_service() {
                urls::choose_template_to_copy(service_id, Some(&item.id), None)
            } else if item.is_folder() {
                urls::choose_template_to_copy(service_id, Some(&item.service_id), Some(&item.id))
            } else {
                urls::copy_template(service_id, &item.id, &item.service_id)
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

fn require_membership(auth_user: &AuthenticatedUser, from_service: &str) -> WebResult<()> {
    if auth_user.user.belongs_to_service(from_service) {
        Ok(())
    } else {
        Err(WebError::Forbidden(format!(
            "User {} does not belong to service {}",
            auth_user.id(),
            from_service
        )))
    }
}

async fn copy_chooser(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    mut flash: Flash,
    service_id: &str,
    from_service: Option<&str>,
    from_folder: Option<&str>,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let from_service = match (from_service, from_folder) {
        (None, Some(_)) => Some(service_id),
        (from_service, _) => from_service,
    };
    let back_url = urls::create_template(service_id, TemplateTypeFilter::All, None);

    let page = match from_service {
        Some(from_service) => {
            require_membership(auth_user, from_service)?;
            let source = state.load_service(from_service).await?;
            let catalog = source.catalog().await?;
            let list = TemplateList::new(
                &catalog,
                source.id(),
                TemplateTypeFilter::All,
                from_folder,
                Some(&auth_user.user),
            );
            let crumbs = catalog
                .get_template_folder_path(from_folder)?
                .into_iter()
                .map(|item| Crumb {
                    url: urls::choose_template_to_copy(service_id, Some(source.id()), item.id.as_deref()),
                    name: item.name,
                })
                .collect();
            CopyPage {
                flashes: flash.take_messages(),
                service_id: service_id.to_string(),
                from_service_name: source.name().to_string(),
                crumbs,
                rows: copy_rows(service_id, list.items()),
                templates_to_show: list.templates_to_show(),
                back_url,
            }
        }
        None => {
            let lists =
                TemplateLists::for_user(&state.apis, &auth_user.user, state.activity_stats_limit_days).await?;
            CopyPage {
                flashes: flash.take_messages(),
                service_id: service_id.to_string(),
                from_service_name: String::new(),
                crumbs: Vec::new(),
                rows: copy_rows(service_id, lists.items()),
                templates_to_show: lists.templates_to_show(),
                back_url,
            }
        }
    };
    Ok((flash, HtmlTemplate(page)).into_response())
}

/// `/templates/copy`.
pub async fn choose_template_to_copy(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(service_id): Path<String>,
    flash: Flash,
) -> WebResult<Response> {
    copy_chooser(&state, &auth_user, flash, &service_id, None, None).await
}

/// `/templates/{all|email|sms}/copy`.
pub async fn choose_typed_template_to_copy(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    if TemplateRef::filter(&segment)? == TemplateTypeFilter::Only(TemplateType::Letter) {
        return Err(WebError::not_found());
    }
    copy_chooser(&state, &auth_user, flash, &service_id, None, None).await
}

/// `/templates/copy/from-folder/{from_folder}`.
pub async fn choose_template_to_copy_from_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, from_folder)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    copy_chooser(&state, &auth_user, flash, &service_id, None, Some(&from_folder)).await
}

/// `/templates/all/folders/{from_folder}/copy`.
pub async fn choose_template_to_copy_from_listing_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, segment, from_folder)): Path<(String, String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    if TemplateRef::filter(&segment)? != TemplateTypeFilter::All {
        return Err(WebError::not_found());
    }
    copy_chooser(&state, &auth_user, flash, &service_id, None, Some(&from_folder)).await
}

/// `/templates/copy/from-service/{from_service}`.
pub async fn choose_template_to_copy_from_service(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, from_service)): Path<(String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    copy_chooser(&state, &auth_user, flash, &service_id, Some(&from_service), None).await
}

/// `/templates/copy/from-service/{from_service}/from-folder/{from_folder}`.
pub async fn choose_template_to_copy_from_service_folder(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, from_service, from_folder)): Path<(String, String, String)>,
    flash: Flash,
) -> WebResult<Response> {
    copy_chooser(
        &state,
        &auth_user,
        flash,
        &service_id,
        Some(&from_service),
        Some(&from_folder),
    )
    .await
}

#[derive(Debug, Deserialize)]
pub struct CopyQuery {
    pub from_service: Option<String>,
}

/// The template to copy, checked against the user's access to its service
/// and folder. Returns it with the folder new copies should go in.
async fn source_template(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service_id: &str,
    template_id: &str,
    from_service: Option<&str>,
) -> WebResult<(crate::domain::entities::Template, Option<String>)> {
    auth_user.require_permissions(service_id, &[permissions::MANAGE_TEMPLATES], false)?;
    let from_service = from_service.ok_or_else(|| WebError::Forbidden("No service to copy from".to_string()))?;
    require_membership(auth_user, from_service)?;

    let template = state
        .apis
        .services
        .get_service_template(from_service, template_id, None)
        .await?;
    let folder = match template.folder.as_deref() {
        Some(folder_id) => Some(
            state
                .apis
                .template_folders
                .get_template_folder(from_service, folder_id)
                .await?,
        ),
        None => None,
    };
    if !auth_user.user.has_template_folder_permission(folder.as_ref()) {
        return Err(WebError::Forbidden(format!(
            "User {} cannot see the folder of template {}",
            auth_user.id(),
            template_id
        )));
    }

    // Folder ids only mean something inside their own service.
    let target_folder = if from_service == service_id {
        folder.map(|folder| folder.id)
    } else {
        None
    };
    Ok((template, target_folder))
}

pub async fn copy_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    Query(query): Query<CopyQuery>,
    flash: Flash,
) -> WebResult<Response> {
    let from_service = query.from_service.as_deref();
    let (template, _) = source_template(&state, &auth_user, &service_id, &template_id, from_service).await?;

    let service = state.load_service(&service_id).await?;
    let existing = service.all_templates().await?;
    let name = template_copy_name(&template.name, existing.iter().map(|t| t.name.as_str()));

    Ok(template_editor::render_copy_form(
        &auth_user,
        flash,
        &service_id,
        &template,
        name,
        urls::copy_template(&service_id, &template_id, from_service.unwrap_or_default()),
        urls::choose_template_to_copy(&service_id, from_service, template.folder.as_deref()),
    ))
}

pub async fn submit_copy_template(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path((service_id, template_id)): Path<(String, String)>,
    Query(query): Query<CopyQuery>,
    flash: Flash,
    Form(form): Form<TemplateForm>,
) -> WebResult<Response> {
    let (template, folder) = source_template(
        &state,
        &auth_user,
        &service_id,
        &template_id,
        query.from_service.as_deref(),
    )
    .await?;

    template_editor::submit_add_template(
        &state,
        &auth_user,
        flash,
        &service_id,
        template.template_type.as_str(),
        folder.as_deref(),
        form,
    )
    .await
}
