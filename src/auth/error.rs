//! Usage: Typed failures of the desktop sign-in handshake.

use crate::shared::error::AppError;
use std::time::Duration;

pub type AuthResult<T> = Result<T, AuthError>;

pub(crate) const GENERIC_EXCHANGE_FAILURE: &str = "token exchange failed";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// `authStart` did not succeed; nothing was registered and no browser was opened.
    #[error("sign-in could not be started: {message}")]
    Start { message: String },

    /// `authExchange` did not succeed; carries the backend's error text when it sent one.
    #[error("{message}")]
    Exchange { message: String },

    #[error("sign-in timed out after {}s without a browser callback", .after.as_secs())]
    Timeout { after: Duration },

    #[error("failed to open the system browser: {message}")]
    Browser { message: String },

    #[error("a sign-in session with this id is already pending")]
    DuplicateSession,

    #[error("invalid session id: {message}")]
    InvalidSession { message: String },

    #[error("{message}")]
    Internal { message: String },
}

impl AuthError {
    pub(crate) fn start(message: impl Into<String>) -> Self {
        Self::Start {
            message: message.into(),
        }
    }

    pub(crate) fn exchange(message: impl Into<String>) -> Self {
        Self::Exchange {
            message: message.into(),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Start { .. } => "AUTH_START_FAILED",
            Self::Exchange { .. } => "AUTH_EXCHANGE_FAILED",
            Self::Timeout { .. } => "AUTH_TIMEOUT",
            Self::Browser { .. } => "AUTH_BROWSER_FAILED",
            Self::DuplicateSession => "AUTH_DUPLICATE_SESSION",
            Self::InvalidSession { .. } => "SEC_INVALID_INPUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(value: AuthError) -> Self {
        AppError::new(value.code(), value.to_string())
    }
}
