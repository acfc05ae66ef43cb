//! Usage: Drives one external sign-in attempt end to end.
//!
//! `Idle -> Started -> AwaitingCallback -> Exchanging -> Succeeded | Failed | TimedOut`
//!
//! The orchestrator owns the session registry for its whole lifetime; the callback router
//! gets a clone of the registry handle and never talks to the orchestrator directly.

use super::backend::{AuthBackend, HttpAuthBackend};
use super::browser::{ensure_web_url, BrowserLauncher, SystemBrowser};
use super::callback::CallbackRouter;
use super::config::AuthConfig;
use super::error::{AuthError, AuthResult};
use super::nonce::generate_client_nonce;
use super::registry::{SessionOutcome, SessionRegistry};
use crate::shared::security::mask_token;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AuthPhase {
    Idle,
    Started,
    AwaitingCallback,
    Exchanging,
    Succeeded,
    Failed,
    TimedOut,
}

impl fmt::Display for AuthPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Started => "started",
            Self::AwaitingCallback => "awaiting_callback",
            Self::Exchanging => "exchanging",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::TimedOut => "timed_out",
        };
        f.write_str(name)
    }
}

/// Per-attempt bookkeeping used for transition logs.
struct Attempt {
    started_at: Instant,
    phase: AuthPhase,
    sid: Option<String>,
}

impl Attempt {
    fn new() -> Self {
        Self {
            started_at: Instant::now(),
            phase: AuthPhase::Idle,
            sid: None,
        }
    }

    fn enter(&mut self, next: AuthPhase) {
        tracing::debug!(
            from = %self.phase,
            to = %next,
            sid = %self.sid.as_deref().map(mask_token).unwrap_or_default(),
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "sign-in phase transition"
        );
        self.phase = next;
    }

    fn fail(&mut self, err: AuthError) -> AuthError {
        let terminal = match &err {
            AuthError::Timeout { .. } => AuthPhase::TimedOut,
            _ => AuthPhase::Failed,
        };
        let from = self.phase;
        self.enter(terminal);
        tracing::warn!(
            from = %from,
            code = err.code(),
            sid = %self.sid.as_deref().map(mask_token).unwrap_or_default(),
            elapsed_ms = self.started_at.elapsed().as_millis() as u64,
            "external sign-in failed: {}",
            err
        );
        err
    }
}

pub(crate) struct AuthOrchestrator {
    backend: Arc<dyn AuthBackend>,
    browser: Arc<dyn BrowserLauncher>,
    registry: SessionRegistry,
    callback_scheme: String,
}

impl AuthOrchestrator {
    /// Production wiring: HTTP backend and the OS default browser.
    pub(crate) fn from_config(cfg: &AuthConfig) -> AuthResult<Self> {
        let backend = HttpAuthBackend::new(cfg)?;
        Ok(Self::new(
            Arc::new(backend),
            Arc::new(SystemBrowser),
            cfg,
        ))
    }

    pub(crate) fn new(
        backend: Arc<dyn AuthBackend>,
        browser: Arc<dyn BrowserLauncher>,
        cfg: &AuthConfig,
    ) -> Self {
        Self {
            backend,
            browser,
            registry: SessionRegistry::new(cfg.callback_timeout),
            callback_scheme: cfg.callback_scheme.clone(),
        }
    }

    pub(crate) fn callback_router(&self) -> CallbackRouter {
        CallbackRouter::new(self.registry.clone(), self.callback_scheme.clone())
    }

    pub(crate) fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Run one attempt and return the backend-issued custom token.
    pub(crate) async fn sign_in(&self) -> AuthResult<String> {
        let mut attempt = Attempt::new();

        let client_nonce = generate_client_nonce();
        attempt.enter(AuthPhase::Started);
        let started = match self.backend.start(&client_nonce).await {
            Ok(started) => started,
            Err(err) => return Err(attempt.fail(err)),
        };
        if let Err(err) = ensure_web_url(&started.authorize_url) {
            return Err(attempt.fail(AuthError::start(format!(
                "authStart returned an unusable authorizeUrl: {err}"
            ))));
        }
        attempt.sid = Some(started.sid.clone());

        let (resolver, outcome) = oneshot::channel();
        if let Err(err) = self.registry.register(&started.sid, &client_nonce, resolver) {
            return Err(attempt.fail(err));
        }
        if let Err(err) = self.browser.open(&started.authorize_url) {
            self.registry.expire(&started.sid);
            return Err(attempt.fail(err));
        }
        attempt.enter(AuthPhase::AwaitingCallback);
        tracing::info!(
            sid = %mask_token(&started.sid),
            timeout_s = self.registry.timeout().as_secs(),
            "waiting for sign-in callback from the system browser"
        );

        let verdict = wait_for_callback(outcome, self.registry.timeout()).await;
        let (sid, client_nonce) = match verdict {
            Ok(callback) => callback,
            Err(err) => return Err(attempt.fail(err)),
        };

        attempt.enter(AuthPhase::Exchanging);
        let token = match self.backend.exchange(&sid, &client_nonce).await {
            Ok(token) => token,
            Err(err) => return Err(attempt.fail(err)),
        };

        attempt.enter(AuthPhase::Succeeded);
        tracing::info!(
            sid = %mask_token(&sid),
            elapsed_ms = attempt.started_at.elapsed().as_millis() as u64,
            "external sign-in succeeded"
        );
        Ok(token)
    }
}

/// Await the registry's verdict for one session; yields `(sid, client_nonce)` on callback.
async fn wait_for_callback(
    outcome: oneshot::Receiver<SessionOutcome>,
    timeout: Duration,
) -> AuthResult<(String, String)> {
    match outcome.await {
        Ok(SessionOutcome::Callback { sid, client_nonce }) => Ok((sid, client_nonce)),
        Ok(SessionOutcome::Expired) => Err(AuthError::Timeout { after: timeout }),
        Err(_) => Err(AuthError::Internal {
            message: "sign-in session was dropped before it completed".to_string(),
        }),
    }
}
