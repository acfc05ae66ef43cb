//! Usage: Route deep-link callbacks (`<scheme>://callback?sid=...`) to pending sign-in sessions.
//!
//! The callback path is driven by OS activation events, so nothing here returns an error or
//! panics: every rejected callback is logged and dropped without touching other sessions.

use super::registry::SessionRegistry;
use crate::shared::security::mask_token;
use reqwest::Url;

pub(crate) const CALLBACK_HOST: &str = "callback";
pub(crate) const SID_QUERY_PARAM: &str = "sid";
const MAX_CALLBACK_URL_LEN: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CallbackParse {
    Sid(String),
    MissingSid,
    NotACallback(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RouteOutcome {
    Resolved,
    MissingSid,
    UnknownSession,
    NotACallback,
}

/// Inbound side of the handshake; shares the registry with the orchestrator but knows
/// nothing about it.
#[derive(Debug, Clone)]
pub(crate) struct CallbackRouter {
    registry: SessionRegistry,
    scheme: String,
}

impl CallbackRouter {
    pub(crate) fn new(registry: SessionRegistry, scheme: impl Into<String>) -> Self {
        Self {
            registry,
            scheme: scheme.into(),
        }
    }

    pub(crate) fn route(&self, raw: &str) -> RouteOutcome {
        route_callback(&self.registry, raw, &self.scheme)
    }

    /// Route every callback URL found in `args`; returns how many were seen.
    pub(crate) fn route_args<I, S>(&self, args: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let urls = callback_urls_from_args(args, &self.scheme);
        for url in &urls {
            self.route(url);
        }
        urls.len()
    }
}

pub(crate) fn parse_callback_url(raw: &str, scheme: &str) -> CallbackParse {
    let raw = raw.trim();
    if raw.len() > MAX_CALLBACK_URL_LEN {
        return CallbackParse::NotACallback("url too long");
    }
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(_) => return CallbackParse::NotACallback("unparsable url"),
    };
    if !url.scheme().eq_ignore_ascii_case(scheme) {
        return CallbackParse::NotACallback("unexpected scheme");
    }
    if !is_callback_target(&url) {
        return CallbackParse::NotACallback("unexpected callback target");
    }

    let sid = url
        .query_pairs()
        .find(|(key, _)| key == SID_QUERY_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|v| !v.is_empty());

    match sid {
        Some(sid) => CallbackParse::Sid(sid),
        None => CallbackParse::MissingSid,
    }
}

/// `app-scheme://callback?...` parses with host `callback`; some platforms hand over
/// `app-scheme:callback?...` or `app-scheme:///callback?...` instead.
fn is_callback_target(url: &Url) -> bool {
    match url.host_str().filter(|host| !host.is_empty()) {
        Some(host) => host.eq_ignore_ascii_case(CALLBACK_HOST),
        None => url.path().trim_matches('/').eq_ignore_ascii_case(CALLBACK_HOST),
    }
}

pub(crate) fn route_callback(registry: &SessionRegistry, raw: &str, scheme: &str) -> RouteOutcome {
    let sid = match parse_callback_url(raw, scheme) {
        CallbackParse::Sid(sid) => sid,
        CallbackParse::MissingSid => {
            tracing::warn!("sign-in callback without sid dropped");
            return RouteOutcome::MissingSid;
        }
        CallbackParse::NotACallback(reason) => {
            tracing::warn!(reason, "inbound url is not a sign-in callback; dropped");
            return RouteOutcome::NotACallback;
        }
    };

    match registry.resolve(&sid) {
        Some(resolved) => {
            tracing::info!(
                sid = %mask_token(&resolved.sid),
                created_at_unix_ms = resolved.created_at_unix_ms,
                "sign-in callback resolved pending session"
            );
            RouteOutcome::Resolved
        }
        None => {
            tracing::warn!(
                sid = %mask_token(&sid),
                "sign-in callback for unknown, expired or consumed session dropped"
            );
            RouteOutcome::UnknownSession
        }
    }
}

/// Pick callback URLs out of a process argv (second-instance activation on Windows/Linux).
pub(crate) fn callback_urls_from_args<I, S>(args: I, scheme: &str) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let prefix = format!("{}:", scheme.to_ascii_lowercase());
    args.into_iter()
        .map(|arg| arg.as_ref().trim().trim_matches('"').to_string())
        .filter(|arg| arg.to_ascii_lowercase().starts_with(&prefix))
        .collect()
}
