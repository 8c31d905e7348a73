use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use axum_extra::extract::cookie::{Key, SignedCookieJar};
use notify_admin::application::services::PreviewDraftStore;
use notify_admin::domain::entities::User;
use notify_admin::infrastructure::http::middleware::AppState;
use notify_admin::infrastructure::http::router::build_router;
use notify_admin::infrastructure::persistence::MemoryStore;
use notify_admin::shared::cookies::{build_cookie, FLASH_COOKIE, SESSION_COOKIE};
use std::sync::Arc;
use tower::ServiceExt;

use super::fake_notify::FakeNotify;
use super::fixtures::{active_user_with_permissions, service_one, service_two};

pub struct TestApp {
    pub notify: FakeNotify,
    pub state: AppState,
    pub user_id: Option<String>,
    /// Sent as the whole `Cookie` header instead of the signed session.
    pub raw_cookie: Option<String>,
}

impl TestApp {
    /// Service one and two exist; the user with every permission on service
    /// one is signed in.
    pub fn new() -> Self {
        Self::signed_in_as(active_user_with_permissions())
    }

    pub fn signed_in_as(user: User) -> Self {
        let notify = FakeNotify::new();
        let user_id = user.id.clone();
        notify.with(|d| {
            d.services = vec![service_one(), service_two()];
            d.users.push(user);
        });
        Self::from_notify(notify, Some(user_id))
    }

    pub fn signed_out() -> Self {
        let notify = FakeNotify::new();
        notify.with(|d| d.services = vec![service_one()]);
        Self::from_notify(notify, None)
    }

    fn from_notify(notify: FakeNotify, user_id: Option<String>) -> Self {
        let state = AppState {
            apis: notify.apis(),
            drafts: PreviewDraftStore::new(Arc::new(MemoryStore::new())),
            cookie_key: Key::generate(),
            activity_stats_limit_days: 7,
            show_styleguide: false,
        };
        Self {
            notify,
            state,
            user_id,
            raw_cookie: None,
        }
    }

    /// `name=value` of a session cookie signed with this app's key.
    pub fn session_cookie(&self, user_id: &str) -> String {
        let response = SignedCookieJar::new(self.state.cookie_key.clone())
            .add(build_cookie(SESSION_COOKIE, user_id.to_string()))
            .into_response();
        response.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string()
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.raw_cookie {
            return builder.header(header::COOKIE, cookie.as_str());
        }
        match &self.user_id {
            Some(id) => builder.header(header::COOKIE, self.session_cookie(id)),
            None => builder,
        }
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        let request = self.request("GET", uri).body(Body::empty()).unwrap();
        self.router().oneshot(request).await.unwrap()
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router().oneshot(request).await.unwrap()
    }
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8_lossy(&bytes).to_string()
}

pub fn location(response: &Response<Body>) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

pub fn assert_redirect(response: &Response<Body>, expected: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), expected);
}

/// Whether the response queued a flash message for the next page.
pub fn sets_flash_cookie(response: &Response<Body>) -> bool {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.starts_with(FLASH_COOKIE) && !v.starts_with(&format!("{}=;", FLASH_COOKIE)))
}

/// The flash messages queued by the response, decoded.
pub fn flash_messages(response: &Response<Body>) -> Vec<notify_admin::shared::FlashMessage> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.strip_prefix(&format!("{}=", FLASH_COOKIE)))
        .filter_map(|v| v.split(';').next())
        .filter_map(notify_admin::shared::cookies::decode_json::<Vec<notify_admin::shared::FlashMessage>>)
        .flatten()
        .collect()
}
