//! Usage: Sign-in Tauri command. This is the only auth surface the webview can reach; it
//! cannot register, resolve or expire sessions itself.

use crate::app_state::AuthState;
use crate::shared::error::AppError;

/// Open the system browser for Google sign-in and resolve with the backend custom token.
#[tauri::command]
#[specta::specta]
pub(crate) async fn auth_start_external_sign_in(
    state: tauri::State<'_, AuthState>,
) -> Result<String, String> {
    let orchestrator = state.orchestrator();
    orchestrator.sign_in().await.map_err(|err| {
        let err = AppError::from(err);
        tracing::debug!(code = err.code(), message = err.message(), "sign-in command failed");
        err.into()
    })
}
