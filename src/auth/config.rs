//! Usage: Sign-in configuration (backend base URL, callback scheme, callback timeout).
//!
//! Defaults target production; each value can be overridden through the environment so dev
//! builds can point at a local functions emulator.

use reqwest::Url;
use std::time::Duration;

pub const DEFAULT_BACKEND_BASE_URL: &str = "https://us-central1-todos-desktop.cloudfunctions.net";
pub const DEFAULT_CALLBACK_SCHEME: &str = "app-scheme";
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(10 * 60);
const MAX_CALLBACK_TIMEOUT_SECS: u64 = 60 * 60;

pub const ENV_BACKEND_BASE_URL: &str = "TODOS_AUTH_BASE_URL";
pub const ENV_CALLBACK_SCHEME: &str = "TODOS_AUTH_CALLBACK_SCHEME";
pub const ENV_CALLBACK_TIMEOUT_SECS: &str = "TODOS_AUTH_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub backend_base_url: String,
    pub callback_scheme: String,
    pub callback_timeout: Duration,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            backend_base_url: DEFAULT_BACKEND_BASE_URL.to_string(),
            callback_scheme: DEFAULT_CALLBACK_SCHEME.to_string(),
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; invalid overrides are logged and ignored.
    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut cfg = Self::default();
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(raw) = read(ENV_BACKEND_BASE_URL) {
            match normalize_base_url(&raw) {
                Some(url) => cfg.backend_base_url = url,
                None => tracing::warn!(
                    key = ENV_BACKEND_BASE_URL,
                    value = %raw,
                    "ignoring invalid backend base url override"
                ),
            }
        }

        if let Some(raw) = read(ENV_CALLBACK_SCHEME) {
            if is_valid_scheme(&raw) {
                cfg.callback_scheme = raw.to_ascii_lowercase();
            } else {
                tracing::warn!(
                    key = ENV_CALLBACK_SCHEME,
                    value = %raw,
                    "ignoring invalid callback scheme override"
                );
            }
        }

        if let Some(raw) = read(ENV_CALLBACK_TIMEOUT_SECS) {
            match raw.parse::<u64>() {
                Ok(secs) => {
                    cfg.callback_timeout =
                        Duration::from_secs(secs.clamp(1, MAX_CALLBACK_TIMEOUT_SECS));
                }
                Err(_) => tracing::warn!(
                    key = ENV_CALLBACK_TIMEOUT_SECS,
                    value = %raw,
                    "ignoring non-numeric callback timeout override"
                ),
            }
        }

        cfg
    }

    pub(crate) fn endpoint(&self, name: &str) -> String {
        format!("{}/{}", self.backend_base_url, name.trim_start_matches('/'))
    }
}

fn normalize_base_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return None;
    }
    if url.query().is_some() || url.fragment().is_some() {
        return None;
    }
    Some(raw.trim_end_matches('/').to_string())
}

/// RFC 3986 scheme: ALPHA *( ALPHA / DIGIT / "+" / "-" / "." ).
fn is_valid_scheme(raw: &str) -> bool {
    let mut chars = raw.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
