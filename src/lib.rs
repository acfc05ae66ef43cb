mod app;
mod auth;
mod commands;
mod shared;
pub mod test_support;

pub(crate) use app::{app_state, deep_link, window};

use app_state::AuthState;
use auth::AuthConfig;
use commands::*;
use tauri::Manager;

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    let builder = tauri::Builder::default().plugin(tauri_plugin_opener::init());

    #[cfg(desktop)]
    let builder = builder.plugin(tauri_plugin_single_instance::init(|app, argv, _cwd| {
        deep_link::on_second_instance(app, argv);
    }));

    let app = builder
        .setup(|app| {
            crate::app::logging::init(app.handle());

            // Payload is intentionally not logged; it may carry user data.
            std::panic::set_hook(Box::new(|panic_info| {
                let location = panic_info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::error!(location = %location, "PANIC: application panicked at {location}");
            }));

            let auth_config = AuthConfig::from_env();
            tracing::info!(
                backend = %auth_config.backend_base_url,
                scheme = %auth_config.callback_scheme,
                timeout_s = auth_config.callback_timeout.as_secs(),
                "sign-in configuration loaded"
            );
            app.manage(AuthState::from_config(&auth_config)?);

            // Cold start from a deep link: the URL is in our own argv.
            deep_link::route_args(app.handle(), std::env::args().skip(1));

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            auth_start_external_sign_in,
            app_version_get,
            app_about_get,
            app_frontend_error_report
        ])
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    app.run(|app_handle, event| {
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        if let tauri::RunEvent::Opened { urls } = &event {
            deep_link::route_opened_urls(app_handle, urls);
        }

        #[cfg(target_os = "macos")]
        if let tauri::RunEvent::Reopen {
            has_visible_windows,
            ..
        } = event
        {
            if !has_visible_windows {
                window::show_main_window(app_handle);
            }
        }

        #[cfg(not(target_os = "macos"))]
        let _ = (app_handle, event);
    });
}

/// Specta type export configuration.
///
/// Run `cargo test export_bindings -- --ignored` to regenerate `generated/bindings.ts`
/// for the web client.
#[cfg(test)]
#[test]
#[ignore = "run manually: cargo test export_bindings -- --ignored"]
fn export_bindings() {
    let builder =
        tauri_specta::Builder::<tauri::Wry>::new().commands(tauri_specta::collect_commands![
            commands::auth::auth_start_external_sign_in,
            commands::app::app_version_get,
            commands::app::app_about_get
        ]);

    builder
        .export(
            specta_typescript::Typescript::default(),
            "generated/bindings.ts",
        )
        .expect("failed to export specta TypeScript bindings");
}
