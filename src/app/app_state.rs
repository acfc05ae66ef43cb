//! Usage: Managed Tauri state for the sign-in handshake, shared by `commands/*` and the
//! deep-link entry points.

use crate::auth::callback::CallbackRouter;
use crate::auth::orchestrator::AuthOrchestrator;
use crate::auth::{AuthConfig, AuthResult};
use std::sync::Arc;

pub(crate) struct AuthState {
    orchestrator: Arc<AuthOrchestrator>,
    router: CallbackRouter,
}

impl AuthState {
    pub(crate) fn from_config(cfg: &AuthConfig) -> AuthResult<Self> {
        Ok(Self::new(AuthOrchestrator::from_config(cfg)?))
    }

    pub(crate) fn new(orchestrator: AuthOrchestrator) -> Self {
        let router = orchestrator.callback_router();
        Self {
            orchestrator: Arc::new(orchestrator),
            router,
        }
    }

    pub(crate) fn orchestrator(&self) -> Arc<AuthOrchestrator> {
        Arc::clone(&self.orchestrator)
    }

    pub(crate) fn router(&self) -> &CallbackRouter {
        &self.router
    }
}
