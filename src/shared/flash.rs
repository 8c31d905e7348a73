use std::convert::Infallible;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponseParts, ResponseParts},
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use super::cookies::{build_cookie, decode_json, encode_json, FLASH_COOKIE};

pub const DEFAULT_WITH_TICK: &str = "default_with_tick";
pub const INFO: &str = "info";
pub const DELETE: &str = "delete";
pub const ERROR: &str = "error";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub category: String,
    pub text: String,
    #[serde(default)]
    pub detail: String,
}

impl FlashMessage {
    pub fn is_delete(&self) -> bool {
        self.category == DELETE
    }
}

/// One-time messages carried to the next page in a cookie.
///
/// Extract it, push messages, and return it alongside the response. Pages
/// that display messages call [`Flash::take_messages`], which clears the
/// cookie once the response goes out.
#[derive(Debug, Clone)]
pub struct Flash {
    jar: CookieJar,
    incoming: Vec<FlashMessage>,
    outgoing: Vec<FlashMessage>,
    consumed: bool,
}

impl Flash {
    pub fn from_jar(jar: CookieJar) -> Self {
        let incoming = jar
            .get(FLASH_COOKIE)
            .and_then(|cookie| decode_json(cookie.value()))
            .unwrap_or_default();
        Self {
            jar,
            incoming,
            outgoing: Vec::new(),
            consumed: false,
        }
    }

    pub fn push(&mut self, category: &str, text: impl Into<String>) {
        self.push_with_detail(category, text, String::new());
    }

    pub fn push_with_detail(&mut self, category: &str, text: impl Into<String>, detail: impl Into<String>) {
        self.outgoing.push(FlashMessage {
            category: category.to_string(),
            text: text.into(),
            detail: detail.into(),
        });
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(ERROR, text);
    }

    pub fn take_messages(&mut self) -> Vec<FlashMessage> {
        let mut messages = if self.consumed {
            Vec::new()
        } else {
            std::mem::take(&mut self.incoming)
        };
        messages.append(&mut self.outgoing);
        self.consumed = true;
        messages
    }

    fn has_incoming_cookie(&self) -> bool {
        self.jar.get(FLASH_COOKIE).is_some()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_jar(CookieJar::from_headers(&parts.headers)))
    }
}

impl IntoResponseParts for Flash {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let had_cookie = self.has_incoming_cookie();
        let mut messages = if self.consumed { Vec::new() } else { self.incoming };
        messages.extend(self.outgoing);

        let jar = if messages.is_empty() {
            if !had_cookie {
                return Ok(res);
            }
            self.jar.remove(Cookie::build(FLASH_COOKIE).path("/"))
        } else {
            match encode_json(&messages) {
                Some(value) => self.jar.add(build_cookie(FLASH_COOKIE, value)),
                None => return Ok(res),
            }
        };
        jar.into_response_parts(res)
    }
}
