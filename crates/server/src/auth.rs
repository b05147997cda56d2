use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use prospector_core::config::ServerConfig;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

/// Static Basic Auth credentials for the inbound API.
pub struct AuthCredentials {
    username: String,
    password: SecretString,
}

impl AuthCredentials {
    pub fn new(config: &ServerConfig) -> Self {
        Self { username: config.auth_username.clone(), password: config.auth_password.clone() }
    }

    /// True when the request carries a Basic Auth header matching the
    /// configured credentials. Both fields are compared in constant time
    /// and both comparisons always run.
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        let Some((username, password)) = decode_basic_header(headers) else {
            warn!(
                event_name = "auth.header.missing",
                "request had no decodable Basic Auth header"
            );
            return false;
        };

        let username_ok = constant_time_eq(username.as_bytes(), self.username.as_bytes());
        let password_ok =
            constant_time_eq(password.as_bytes(), self.password.expose_secret().as_bytes());

        if !(username_ok & password_ok) {
            warn!(event_name = "auth.credentials.rejected", %username, "invalid login attempt");
            return false;
        }

        true
    }
}

fn decode_basic_header(headers: &HeaderMap) -> Option<(String, String)> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = header.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;

    let (username, password) = decoded.split_once(':')?;
    Some((username.to_string(), password.to_string()))
}

/// Byte-wise comparison without an early exit on the first mismatch.
/// Length still short-circuits, which is what the original credential check
/// leaked as well.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
