//! Usage: App-level Tauri commands (version/about, frontend error relay).

fn sanitize_text(input: Option<String>, max_len: usize) -> Option<String> {
    let value = input?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(max_len).collect())
}

#[derive(Debug, Clone, serde::Serialize, specta::Type)]
pub(crate) struct AppAboutInfo {
    os: String,
    arch: String,
    profile: String,
    app_version: String,
}

#[tauri::command]
#[specta::specta]
pub(crate) fn app_version_get() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[tauri::command]
#[specta::specta]
pub(crate) fn app_about_get() -> AppAboutInfo {
    AppAboutInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        profile: if cfg!(debug_assertions) {
            "debug".to_string()
        } else {
            "release".to_string()
        },
        app_version: app_version_get(),
    }
}

#[tauri::command]
pub(crate) fn app_frontend_error_report(
    source: String,
    message: String,
    stack: Option<String>,
    href: Option<String>,
) -> Result<bool, String> {
    let source = sanitize_text(Some(source), 128).unwrap_or_else(|| "unknown".to_string());
    let message = sanitize_text(Some(message), 4096).unwrap_or_else(|| "unknown".to_string());
    let stack = sanitize_text(stack, 16_384);
    let href = sanitize_text(href, 2_048);

    tracing::error!(
        target: "frontend",
        source = %source,
        href = %href.as_deref().unwrap_or_default(),
        stack = %stack.as_deref().unwrap_or_default(),
        "frontend runtime error: {}",
        message
    );

    Ok(true)
}
