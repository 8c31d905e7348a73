use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use std::fmt;

use crate::domain::errors::{ApiClientError, DomainError};
use crate::shared::FlashMessage;

pub const SIGN_IN_PATH: &str = "/sign-in";

#[derive(Debug)]
pub enum WebError {
    NotFound(String),
    BadRequest(String),
    Unauthorized,
    Forbidden(String),
    Internal(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::NotFound(msg) => write!(f, "Not found: {}", msg),
            WebError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            WebError::Unauthorized => write!(f, "Unauthorized"),
            WebError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            WebError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorPage {
    status_code: u16,
    heading: String,
    message: String,
    flashes: Vec<FlashMessage>,
}

impl WebError {
    pub fn not_found() -> Self {
        WebError::NotFound("Page not found".to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::Forbidden(_) => StatusCode::FORBIDDEN,
            WebError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn heading(&self) -> &'static str {
        match self {
            WebError::NotFound(_) => "Page not found",
            WebError::BadRequest(_) => "There’s a problem with your request",
            WebError::Unauthorized => "Sign in",
            WebError::Forbidden(_) => "You do not have permission to view this page",
            WebError::Internal(_) => "Sorry, there’s a problem with the service",
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if matches!(self, WebError::Unauthorized) {
            return Redirect::to(SIGN_IN_PATH).into_response();
        }

        let status = self.status();
        let message = match &self {
            WebError::Internal(msg) => {
                tracing::error!("Request failed: {}", msg);
                "Try again later.".to_string()
            }
            WebError::NotFound(msg) | WebError::BadRequest(msg) | WebError::Forbidden(msg) => {
                tracing::info!("{}: {}", status, msg);
                msg.clone()
            }
            WebError::Unauthorized => String::new(),
        };

        let page = ErrorPage {
            status_code: status.as_u16(),
            heading: self.heading().to_string(),
            message,
            flashes: Vec::new(),
        };
        match page.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to render template: {}", err),
            )
                .into_response(),
        }
    }
}

impl From<ApiClientError> for WebError {
    fn from(err: ApiClientError) -> Self {
        match err.status() {
            Some(404) => WebError::NotFound(err.to_string()),
            Some(403) => WebError::Forbidden(err.to_string()),
            Some(401) => WebError::Unauthorized,
            Some(400) => WebError::BadRequest(err.to_string()),
            _ => WebError::Internal(err.to_string()),
        }
    }
}

impl From<DomainError> for WebError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(msg) => WebError::NotFound(msg),
            DomainError::Forbidden(msg) => WebError::Forbidden(msg),
            DomainError::Internal(msg) => WebError::Internal(msg),
            DomainError::Api(err) => WebError::from(err),
        }
    }
}

pub type WebResult<T> = Result<T, WebError>;
