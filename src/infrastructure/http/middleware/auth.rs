use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use axum_extra::extract::cookie::Key;

use crate::application::models::Service;
use crate::application::services::PreviewDraftStore;
use crate::domain::entities::User;
use crate::domain::ports::NotifyApis;
use crate::shared::cookies::session_user_id;

use super::error::{WebError, WebResult, SIGN_IN_PATH};

#[derive(Clone)]
pub struct AppState {
    pub apis: NotifyApis,
    pub drafts: PreviewDraftStore,
    pub cookie_key: Key,
    pub activity_stats_limit_days: i64,
    pub show_styleguide: bool,
}

impl AppState {
    /// The service in the URL, with its lazily loaded data scoped to this
    /// request.
    pub async fn load_service(&self, service_id: &str) -> WebResult<Service> {
        Ok(Service::from_id(&self.apis, service_id, self.activity_stats_limit_days).await?)
    }
}

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user: User,
}

impl AuthenticatedUser {
    pub fn id(&self) -> &str {
        &self.user.id
    }

    pub fn is_platform_admin(&self) -> bool {
        self.user.platform_admin
    }

    /// Passes when the user holds any of `any_of` on the service. An empty
    /// list asks only for membership.
    pub fn require_permissions(
        &self,
        service_id: &str,
        any_of: &[&str],
        restrict_admin_usage: bool,
    ) -> WebResult<()> {
        if self.user.has_permissions(service_id, any_of, restrict_admin_usage) {
            Ok(())
        } else {
            Err(WebError::Forbidden(format!(
                "User {} lacks {:?} on service {}",
                self.user.id, any_of, service_id
            )))
        }
    }

    pub fn require_platform_admin(&self) -> WebResult<()> {
        if self.is_platform_admin() {
            Ok(())
        } else {
            Err(WebError::Forbidden(format!(
                "User {} is not a platform admin",
                self.user.id
            )))
        }
    }
}

/// Loads the signed-in user from the session cookie, or sends the browser
/// to sign in.
pub async fn web_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(user_id) = session_user_id(request.headers(), &state.cookie_key) else {
        return Redirect::to(SIGN_IN_PATH).into_response();
    };

    match state.apis.users.get_user(&user_id).await {
        Ok(user) if user.is_active() => {
            request.extensions_mut().insert(AuthenticatedUser { user });
            next.run(request).await
        }
        Ok(user) => {
            tracing::warn!("Inactive user {} tried to use the console", user.id);
            Redirect::to(SIGN_IN_PATH).into_response()
        }
        Err(e) if e.is_not_found() => Redirect::to(SIGN_IN_PATH).into_response(),
        Err(e) => WebError::from(e).into_response(),
    }
}
