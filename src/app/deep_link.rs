//! Usage: OS entry points for `<scheme>://callback` deep links.
//!
//! Deep links arrive three ways: in argv of a second instance (Windows/Linux, forwarded by
//! the single-instance plugin), as `RunEvent::Opened` (macOS), or in the first instance's
//! own argv on a cold start. All of them end in `CallbackRouter`.

use crate::app_state::AuthState;
use crate::window;
use tauri::{Manager, Runtime};

pub(crate) fn on_second_instance<R: Runtime>(app: &tauri::AppHandle<R>, argv: Vec<String>) {
    window::show_main_window(app);
    route_args(app, argv);
}

pub(crate) fn route_args<R: Runtime, I, S>(app: &tauri::AppHandle<R>, args: I)
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(state) = app.try_state::<AuthState>() else {
        tracing::warn!("deep link received before auth state was initialized; dropped");
        return;
    };
    let routed = state.router().route_args(args);
    if routed > 0 {
        tracing::debug!(routed, "deep links routed from process arguments");
    }
}

#[cfg_attr(not(any(target_os = "macos", target_os = "ios")), allow(dead_code))]
pub(crate) fn route_opened_urls<R: Runtime>(app: &tauri::AppHandle<R>, urls: &[tauri::Url]) {
    window::show_main_window(app);
    let Some(state) = app.try_state::<AuthState>() else {
        tracing::warn!("deep link received before auth state was initialized; dropped");
        return;
    };
    for url in urls {
        state.router().route(url.as_str());
    }
}
