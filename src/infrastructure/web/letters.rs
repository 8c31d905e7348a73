use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
};

use crate::domain::ports::{PreviewFileType, RenderedPreview};
use crate::infrastructure::http::middleware::{AppState, AuthenticatedUser, WebResult};

const EXAMPLE_LETTER_SUBJECT: &str = "An example letter";

const EXAMPLE_LETTER_CONTENT: &str = "Lorem Ipsum is simply dummy text of the printing and typesetting \
industry.\n\nLorem Ipsum has been the industry’s standard dummy \
text ever since the 1500s, when an unknown printer took a galley \
of type and scrambled it to make a type specimen book.\n\n\
# History\n\nIt has survived not only\n\n\
* five centuries\n\
* but also the leap into electronic typesetting\n\n\
It was popularised in the 1960s with the release of Letraset \
sheets containing Lorem Ipsum passages, and more recently with \
desktop publishing software like Aldus PageMaker including \
versions of Lorem Ipsum.\n\n\
The point of using Lorem Ipsum is that it has a more-or-less \
normal distribution of letters, as opposed to using ‘Content \
here, content here’, making it look like readable English.";

fn file_response(preview: RenderedPreview) -> Response {
    ([(header::CONTENT_TYPE, preview.content_type)], preview.bytes).into_response()
}

/// `/templates/{template_id}.{pdf|png}`, optionally one `?page=`.
pub async fn view_letter_template_preview(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service_id: &str,
    template_id: &str,
    filetype: PreviewFileType,
    page: Option<u32>,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    let service = state.load_service(service_id).await?;
    let template = service.get_template(template_id, None).await?;
    let preview = state
        .apis
        .template_preview
        .render(&template, filetype, page, None)
        .await?;
    Ok(file_response(preview))
}

/// `/templates/{template_id}/version/{n}.{pdf|png}`.
pub async fn view_template_version_preview(
    state: &AppState,
    auth_user: &AuthenticatedUser,
    service_id: &str,
    template_id: &str,
    version: i64,
    filetype: PreviewFileType,
) -> WebResult<Response> {
    auth_user.require_permissions(service_id, &[], false)?;
    let service = state.load_service(service_id).await?;
    let template = service.get_template(template_id, Some(version)).await?;
    let preview = state
        .apis
        .template_preview
        .render(&template, filetype, None, None)
        .await?;
    Ok(file_response(preview))
}

/// An example letter with the named branding file, or none for `no-branding`.
pub async fn letter_branding_preview_image(
    State(state): State<AppState>,
    axum::Extension(auth_user): axum::Extension<AuthenticatedUser>,
    Path(filename): Path<String>,
) -> WebResult<Response> {
    auth_user.require_platform_admin()?;
    let branding = branding_filename(&filename);
    let preview = state
        .apis
        .template_preview
        .render_example(EXAMPLE_LETTER_SUBJECT, EXAMPLE_LETTER_CONTENT, branding)
        .await?;
    Ok(file_response(preview))
}

fn branding_filename(filename: &str) -> Option<&str> {
    (filename != "no-branding").then_some(filename)
}
