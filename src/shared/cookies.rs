use std::collections::BTreeMap;

use axum::http::HeaderMap;
use axum_extra::extract::cookie::{Cookie, CookieJar, Key, SameSite, SignedCookieJar};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Holds the signed-in user's id, signed with the `SECRET_KEY` cookie key.
pub const SESSION_COOKIE: &str = "notify_admin_session";
pub const FLASH_COOKIE: &str = "notify_admin_flash";
/// Recipient and placeholder values for sending a single message.
pub const ONE_OFF_COOKIE: &str = "notify_admin_one_off";

pub fn encode_json<T: Serialize>(value: &T) -> Option<String> {
    serde_json::to_vec(value)
        .ok()
        .map(|bytes| URL_SAFE_NO_PAD.encode(bytes))
}

pub fn decode_json<T: DeserializeOwned>(value: &str) -> Option<T> {
    let bytes = URL_SAFE_NO_PAD.decode(value).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// The user id from a session cookie whose signature checks out. Unsigned
/// or tampered cookies yield nothing.
pub fn session_user_id(headers: &HeaderMap, key: &Key) -> Option<String> {
    SignedCookieJar::from_headers(headers, key.clone())
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().trim().to_string())
        .filter(|id| !id.is_empty())
}

pub fn build_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// State of the one-off send flow: who it goes to and the placeholder
/// values entered so far, keyed by column heading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OneOffSession {
    pub recipient: Option<String>,
    pub placeholders: BTreeMap<String, String>,
}

pub fn one_off_cookie(session: &OneOffSession) -> Option<Cookie<'static>> {
    encode_json(session).map(|value| build_cookie(ONE_OFF_COOKIE, value))
}

pub fn one_off_session(headers: &HeaderMap) -> OneOffSession {
    CookieJar::from_headers(headers)
        .get(ONE_OFF_COOKIE)
        .and_then(|cookie| decode_json(cookie.value()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::response::IntoResponse;

    /// `name=value` of the session cookie as the jar would set it.
    fn signed_session(key: &Key, user_id: &str) -> String {
        let response = SignedCookieJar::new(key.clone())
            .add(build_cookie(SESSION_COOKIE, user_id.to_string()))
            .into_response();
        let set_cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_session_user_id() {
        let key = Key::generate();
        let mut headers = HeaderMap::new();
        assert_eq!(session_user_id(&headers, &key), None);

        let cookie = format!("other=1; {}", signed_session(&key, "user-1"));
        headers.insert(COOKIE, cookie.parse().unwrap());
        assert_eq!(session_user_id(&headers, &key).as_deref(), Some("user-1"));
    }

    #[test]
    fn test_unsigned_session_is_rejected() {
        let key = Key::generate();
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "notify_admin_session=user-1".parse().unwrap());
        assert_eq!(session_user_id(&headers, &key), None);
    }

    #[test]
    fn test_session_signed_with_another_key_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, signed_session(&Key::generate(), "user-1").parse().unwrap());
        assert_eq!(session_user_id(&headers, &Key::generate()), None);
    }

    #[test]
    fn test_one_off_session_survives_the_cookie() {
        let mut session = OneOffSession {
            recipient: Some("6502532222".to_string()),
            ..Default::default()
        };
        session
            .placeholders
            .insert("phone number".to_string(), "6502532222".to_string());
        let cookie = one_off_cookie(&session).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            format!("{}={}", ONE_OFF_COOKIE, cookie.value()).parse().unwrap(),
        );
        assert_eq!(one_off_session(&headers), session);
    }

    #[test]
    fn test_garbage_decodes_to_nothing() {
        assert_eq!(decode_json::<Vec<String>>("%%%"), None);
    }
}
