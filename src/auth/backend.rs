//! Usage: HTTP client for the sign-in backend (`authStart` / `authExchange` cloud functions).

use super::config::AuthConfig;
use super::error::{AuthError, AuthResult, GENERIC_EXCHANGE_FAILURE};
use crate::shared::security::sanitize_body_snippet;
use serde_json::{json, Value};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

const START_ENDPOINT: &str = "authStart";
const EXCHANGE_ENDPOINT: &str = "authExchange";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_ERROR_MESSAGE_CHARS: usize = 240;

pub(crate) type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = AuthResult<T>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StartResponse {
    pub(crate) authorize_url: String,
    pub(crate) sid: String,
}

/// Backend collaborator of the orchestrator. Nonce verification is the backend's job.
pub(crate) trait AuthBackend: Send + Sync {
    fn start<'a>(&'a self, client_nonce: &'a str) -> BackendFuture<'a, StartResponse>;

    fn exchange<'a>(&'a self, sid: &'a str, client_nonce: &'a str) -> BackendFuture<'a, String>;
}

pub(crate) struct HttpAuthBackend {
    client: reqwest::Client,
    start_url: String,
    exchange_url: String,
}

impl HttpAuthBackend {
    pub(crate) fn new(cfg: &AuthConfig) -> AuthResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("todos-desktop-auth/{}", env!("CARGO_PKG_VERSION")))
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::Internal {
                message: format!("auth http client init failed: {e}"),
            })?;

        Ok(Self {
            client,
            start_url: cfg.endpoint(START_ENDPOINT),
            exchange_url: cfg.endpoint(EXCHANGE_ENDPOINT),
        })
    }

    async fn post_json(&self, url: &str, body: Value) -> Result<(reqwest::StatusCode, String), String> {
        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| format!("response read failed: {e}"))?;
        Ok((status, text))
    }
}

impl AuthBackend for HttpAuthBackend {
    fn start<'a>(&'a self, client_nonce: &'a str) -> BackendFuture<'a, StartResponse> {
        Box::pin(async move {
            let (status, body) = self
                .post_json(&self.start_url, json!({ "clientNonce": client_nonce }))
                .await
                .map_err(|e| AuthError::start(format!("authStart {e}")))?;

            if !status.is_success() {
                tracing::warn!(
                    status = status.as_u16(),
                    body = %sanitize_body_snippet(&body),
                    "authStart returned non-success status"
                );
                let mut message = format!("authStart returned status={}", status.as_u16());
                if let Some(detail) = parse_error_message(&body) {
                    message.push_str(": ");
                    message.push_str(&detail);
                }
                return Err(AuthError::start(message));
            }

            parse_start_response(&body)
        })
    }

    fn exchange<'a>(&'a self, sid: &'a str, client_nonce: &'a str) -> BackendFuture<'a, String> {
        Box::pin(async move {
            let (status, body) = self
                .post_json(
                    &self.exchange_url,
                    json!({ "sid": sid, "clientNonce": client_nonce }),
                )
                .await
                .map_err(|e| AuthError::exchange(format!("authExchange {e}")))?;

            if !status.is_success() {
                tracing::warn!(
                    status = status.as_u16(),
                    body = %sanitize_body_snippet(&body),
                    "authExchange returned non-success status"
                );
                let message = parse_error_message(&body)
                    .unwrap_or_else(|| GENERIC_EXCHANGE_FAILURE.to_string());
                return Err(AuthError::exchange(message));
            }

            parse_exchange_response(&body)
        })
    }
}

fn non_empty_str<'a>(value: &'a Value, key: &str) -> Option<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

pub(crate) fn parse_start_response(body: &str) -> AuthResult<StartResponse> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AuthError::start(format!("authStart response json invalid: {e}")))?;

    let authorize_url = non_empty_str(&value, "authorizeUrl")
        .ok_or_else(|| AuthError::start("authStart response missing authorizeUrl"))?;
    let sid = non_empty_str(&value, "sid")
        .ok_or_else(|| AuthError::start("authStart response missing sid"))?;

    Ok(StartResponse {
        authorize_url: authorize_url.to_string(),
        sid: sid.to_string(),
    })
}

pub(crate) fn parse_exchange_response(body: &str) -> AuthResult<String> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        AuthError::exchange(format!("{GENERIC_EXCHANGE_FAILURE}: response json invalid: {e}"))
    })?;
    non_empty_str(&value, "customToken")
        .map(str::to_string)
        .ok_or_else(|| {
            AuthError::exchange(format!(
                "{GENERIC_EXCHANGE_FAILURE}: response missing customToken"
            ))
        })
}

/// Extract `{error: "..."}` or `{error: {message: "..."}}` from an error body.
pub(crate) fn parse_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let error = value.get("error")?;
    let message = match error {
        Value::String(s) => Some(s.trim()),
        Value::Object(obj) => obj
            .get("message")
            .and_then(Value::as_str)
            .map(str::trim),
        _ => None,
    }?;
    if message.is_empty() {
        return None;
    }
    Some(message.chars().take(MAX_ERROR_MESSAGE_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_response_requires_url_and_sid() {
        let ok = parse_start_response(
            r#"{"authorizeUrl":"https://provider/authorize","sid":"abc123"}"#,
        )
        .expect("start response");
        assert_eq!(ok.authorize_url, "https://provider/authorize");
        assert_eq!(ok.sid, "abc123");

        let err = parse_start_response(r#"{"authorizeUrl":"https://provider/authorize"}"#)
            .expect_err("missing sid");
        assert_eq!(err.code(), "AUTH_START_FAILED");
        assert!(err.to_string().contains("missing sid"));

        let err = parse_start_response("<html>").expect_err("not json");
        assert_eq!(err.code(), "AUTH_START_FAILED");
    }

    #[test]
    fn exchange_response_requires_custom_token() {
        assert_eq!(
            parse_exchange_response(r#"{"customToken":"tok_xyz"}"#).expect("token"),
            "tok_xyz"
        );
        let err = parse_exchange_response(r#"{"customToken":"  "}"#).expect_err("empty token");
        assert_eq!(err.code(), "AUTH_EXCHANGE_FAILED");
    }

    #[test]
    fn error_message_supports_string_and_object_forms() {
        assert_eq!(
            parse_error_message(r#"{"error":"nonce mismatch"}"#).as_deref(),
            Some("nonce mismatch")
        );
        assert_eq!(
            parse_error_message(r#"{"error":{"message":"session expired","status":"UNAUTHENTICATED"}}"#)
                .as_deref(),
            Some("session expired")
        );
        assert_eq!(parse_error_message(r#"{"error":""}"#), None);
        assert_eq!(parse_error_message(r#"{"detail":"x"}"#), None);
        assert_eq!(parse_error_message("Internal Server Error"), None);
    }

    #[test]
    fn error_message_is_truncated() {
        let long = "e".repeat(1_000);
        let body = json!({ "error": long }).to_string();
        assert_eq!(parse_error_message(&body).map(|m| m.len()), Some(240));
    }
}
