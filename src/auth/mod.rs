//! Usage: Desktop sign-in handshake (system browser + deep-link callback + token exchange).
//!
//! Only `orchestrator` registers sessions; the callback router resolves them through a
//! shared registry handle. Nothing here is reachable from the UI except through
//! `commands::auth`.

pub(crate) mod backend;
pub(crate) mod browser;
pub(crate) mod callback;
pub(crate) mod config;
pub(crate) mod error;
pub(crate) mod nonce;
pub(crate) mod orchestrator;
pub(crate) mod registry;

pub use config::AuthConfig;
pub use error::{AuthError, AuthResult};
