//! Usage: Open the authorization URL in the system default browser (never in an app webview).

use super::error::{AuthError, AuthResult};
use reqwest::Url;
use std::process::Command;

pub(crate) trait BrowserLauncher: Send + Sync {
    fn open(&self, url: &str) -> AuthResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct SystemBrowser;

impl BrowserLauncher for SystemBrowser {
    fn open(&self, url: &str) -> AuthResult<()> {
        let url = ensure_web_url(url)?;
        let mut cmd = build_open_browser_command(url.as_str())?;
        cmd.spawn().map_err(|e| AuthError::Browser {
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Only `http`/`https` URLs are handed to the OS; anything else could launch a local handler.
pub(crate) fn ensure_web_url(raw: &str) -> AuthResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| AuthError::Browser {
        message: format!("invalid authorize url: {e}"),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(AuthError::Browser {
            message: format!("refusing to open non-web url scheme `{}`", url.scheme()),
        });
    }
    Ok(url)
}

#[allow(unreachable_code)]
fn build_open_browser_command(url: &str) -> AuthResult<Command> {
    #[cfg(target_os = "windows")]
    {
        let mut cmd = Command::new("rundll32.exe");
        // The URL protocol handler always resolves to the default browser; `explorer <url>`
        // can open File Explorer for some URL shapes.
        cmd.arg("url.dll,FileProtocolHandler").arg(url);
        return Ok(cmd);
    }

    #[cfg(target_os = "macos")]
    {
        let mut cmd = Command::new("open");
        cmd.arg(url);
        return Ok(cmd);
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    {
        let mut cmd = Command::new("xdg-open");
        cmd.arg(url);
        return Ok(cmd);
    }

    Err(AuthError::Browser {
        message: "browser open is unsupported on this platform".to_string(),
    })
}
