//! Usage: Public test helpers for integration tests.
//!
//! Builds the real orchestrator (HTTP backend included) with a browser launcher that only
//! records URLs, so `tests/` can drive the handshake against a mock backend.

use crate::auth::browser::BrowserLauncher;
use crate::auth::callback::RouteOutcome;
use crate::auth::orchestrator::AuthOrchestrator;
use crate::auth::{AuthConfig, AuthResult};
use crate::app_state::AuthState;
use crate::shared::error::AppError;
use crate::shared::mutex_ext::MutexExt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct RecordingBrowser {
    opened: Mutex<Vec<String>>,
}

impl BrowserLauncher for RecordingBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        self.opened.lock_or_recover().push(url.to_string());
        Ok(())
    }
}

pub struct SignInHarness {
    state: AuthState,
    browser: Arc<RecordingBrowser>,
}

/// Harness talking to `backend_base_url` with the default callback scheme.
pub fn sign_in_harness(
    backend_base_url: &str,
    callback_timeout: Duration,
) -> Result<SignInHarness, String> {
    let cfg = AuthConfig {
        backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
        callback_timeout,
        ..AuthConfig::default()
    };
    let backend = crate::auth::backend::HttpAuthBackend::new(&cfg)
        .map_err(|e| String::from(AppError::from(e)))?;
    let browser = Arc::new(RecordingBrowser::default());
    let orchestrator = AuthOrchestrator::new(Arc::new(backend), browser.clone(), &cfg);

    Ok(SignInHarness {
        state: AuthState::new(orchestrator),
        browser,
    })
}

impl SignInHarness {
    /// Same rendering as the `auth_start_external_sign_in` command.
    pub async fn sign_in(&self) -> Result<String, String> {
        let orchestrator = self.state.orchestrator();
        orchestrator
            .sign_in()
            .await
            .map_err(|err| AppError::from(err).into())
    }

    /// Route a deep-link URL; returns the outcome name.
    pub fn deliver_callback(&self, url: &str) -> &'static str {
        match self.state.router().route(url) {
            RouteOutcome::Resolved => "resolved",
            RouteOutcome::MissingSid => "missing_sid",
            RouteOutcome::UnknownSession => "unknown_session",
            RouteOutcome::NotACallback => "not_a_callback",
        }
    }

    /// Route callbacks found in a second-instance argv.
    pub fn deliver_second_instance_args(&self, argv: &[&str]) -> usize {
        self.state.router().route_args(argv)
    }

    pub fn is_pending(&self, sid: &str) -> bool {
        self.state.orchestrator().registry().contains(sid)
    }

    pub fn pending_count(&self) -> usize {
        self.state.orchestrator().registry().len()
    }

    pub fn opened_urls(&self) -> Vec<String> {
        self.browser.opened.lock_or_recover().clone()
    }
}
