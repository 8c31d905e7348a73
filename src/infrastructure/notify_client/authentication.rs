use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// HS256 token the notification API accepts as a bearer credential.
///
/// Claims are the client id as issuer and the issue time in seconds.
pub fn create_jwt_token(secret: &str, client_id: &str, issued_at: i64) -> String {
    let header = json!({ "typ": "JWT", "alg": "HS256" });
    let claims = json!({ "iss": client_id, "iat": issued_at });

    let signing_input = format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    );

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(signing_input.as_bytes());
    let signature = mac.finalize().into_bytes();

    format!("{}.{}", signing_input, URL_SAFE_NO_PAD.encode(signature))
}
