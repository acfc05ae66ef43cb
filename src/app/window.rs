//! Usage: Main window helpers used when the OS re-activates the app.

use tauri::{Manager, Runtime};

pub(crate) const MAIN_WINDOW_LABEL: &str = "main";

/// Unminimize, show and focus the main window so callbacks land in a live window.
pub(crate) fn show_main_window<R: Runtime>(app: &tauri::AppHandle<R>) {
    let Some(window) = app.get_webview_window(MAIN_WINDOW_LABEL) else {
        tracing::debug!("show_main_window: main window not found");
        return;
    };

    if window.is_minimized().unwrap_or(false) {
        if let Err(err) = window.unminimize() {
            tracing::debug!("unminimize main window failed: {}", err);
        }
    }
    if let Err(err) = window.show() {
        tracing::debug!("show main window failed: {}", err);
    }
    if let Err(err) = window.set_focus() {
        tracing::debug!("focus main window failed: {}", err);
    }
}
