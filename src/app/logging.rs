//! Usage: Tracing setup (stderr + daily-rolling file in the app log dir).

use std::path::PathBuf;
use std::sync::Mutex;
use tauri::{Manager, Runtime};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_FILE_PREFIX: &str = "todos-desktop.log";
const DEFAULT_FILTER: &str = "info";
pub(crate) const ENV_LOG_FILTER: &str = "TODOS_LOG";

/// Keeps the non-blocking file writer flushing for the lifetime of the app.
pub(crate) struct LogGuardState(#[allow(dead_code)] Mutex<Option<WorkerGuard>>);

pub(crate) fn filter_directive(app_filter: Option<String>, rust_log: Option<String>) -> String {
    [app_filter, rust_log]
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn build_filter() -> EnvFilter {
    let directive = filter_directive(
        std::env::var(ENV_LOG_FILTER).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    EnvFilter::try_new(&directive).unwrap_or_else(|err| {
        eprintln!("invalid log filter `{directive}` ({err}); falling back to `{DEFAULT_FILTER}`");
        EnvFilter::new(DEFAULT_FILTER)
    })
}

fn log_dir<R: Runtime>(app: &tauri::AppHandle<R>) -> Option<PathBuf> {
    let dir = app.path().app_log_dir().ok()?;
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

pub(crate) fn init<R: Runtime>(app: &tauri::AppHandle<R>) {
    if let Err(err) = tracing_log::LogTracer::init() {
        eprintln!("log bridge already installed: {err}");
    }

    let stderr_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let dir = log_dir(app);
    let (file_layer, guard) = match dir.as_ref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter())
        .with(stderr_layer)
        .with(file_layer);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("tracing subscriber already installed; keeping the existing one");
        return;
    }

    app.manage(LogGuardState(Mutex::new(guard)));
    match dir {
        Some(dir) => tracing::info!(dir = %dir.display(), "logging initialized"),
        None => tracing::warn!("app log dir unavailable; logging to stderr only"),
    }
}
