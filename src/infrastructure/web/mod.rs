pub mod copy;
pub mod folders;
pub mod forms;
pub mod letters;
pub mod recipients;
pub mod styleguide;
pub mod template_editor;
pub mod template_settings;
pub mod templates;
pub mod urls;

use askama::Template;
use axum::{
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_extra::extract::Form;
use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::domain::entities::TemplateTypeFilter;
use crate::domain::errors::{ApiClientError, DomainError};
use crate::domain::ports::PreviewFileType;
use crate::infrastructure::http::middleware::{WebError, WebResult};

pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

/// Reads a urlencoded body for handlers that pick the form type at runtime.
pub async fn parse_form<T: DeserializeOwned>(request: Request) -> WebResult<T> {
    let Form(form) = Form::<T>::from_request(request, &())
        .await
        .map_err(|e| WebError::BadRequest(e.to_string()))?;
    Ok(form)
}

/// The API's own wording for a failed call, for showing in a banner.
///
/// Anything other than an HTTP error response is passed back unchanged.
pub fn api_error_message(err: DomainError) -> Result<String, DomainError> {
    match err {
        DomainError::Api(ApiClientError::Http { message, .. }) => Ok(message.to_string()),
        other => Err(other),
    }
}

/// What a `/templates/{segment}` path segment names.
///
/// Template ids, letter preview files and listing filters share the
/// segment, so it is parsed here rather than by the router.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateRef {
    Template(String),
    File {
        template_id: String,
        filetype: PreviewFileType,
    },
    Filter(TemplateTypeFilter),
    /// `add-email`, `add-sms` or `add-letter`.
    Add(String),
}

fn split_file_extension(segment: &str) -> Option<(&str, PreviewFileType)> {
    let (stem, extension) = segment.rsplit_once('.')?;
    Some((stem, extension.parse().ok()?))
}

impl std::str::FromStr for TemplateRef {
    type Err = String;

    fn from_str(segment: &str) -> Result<Self, Self::Err> {
        if let Some((stem, filetype)) = split_file_extension(segment) {
            if Uuid::parse_str(stem).is_ok() {
                return Ok(TemplateRef::File {
                    template_id: stem.to_string(),
                    filetype,
                });
            }
        }
        if Uuid::parse_str(segment).is_ok() {
            return Ok(TemplateRef::Template(segment.to_string()));
        }
        if let Some(template_type) = segment.strip_prefix("add-") {
            return Ok(TemplateRef::Add(template_type.to_string()));
        }
        segment
            .parse()
            .map(TemplateRef::Filter)
            .map_err(|_| format!("Not a template or template type: {}", segment))
    }
}

impl TemplateRef {
    pub fn parse(segment: &str) -> WebResult<Self> {
        segment.parse().map_err(WebError::NotFound)
    }

    pub fn template_id(segment: &str) -> WebResult<String> {
        match Self::parse(segment)? {
            TemplateRef::Template(id) => Ok(id),
            _ => Err(WebError::not_found()),
        }
    }

    pub fn filter(segment: &str) -> WebResult<TemplateTypeFilter> {
        match Self::parse(segment)? {
            TemplateRef::Filter(filter) => Ok(filter),
            _ => Err(WebError::not_found()),
        }
    }
}

/// `3` or `3.png` in a version URL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VersionRef {
    pub version: i64,
    pub filetype: Option<PreviewFileType>,
}

impl VersionRef {
    pub fn parse(segment: &str) -> WebResult<Self> {
        let (number, filetype) = match split_file_extension(segment) {
            Some((stem, filetype)) => (stem, Some(filetype)),
            None => (segment, None),
        };
        let version = number.parse().map_err(|_| WebError::not_found())?;
        Ok(Self { version, filetype })
    }
}
