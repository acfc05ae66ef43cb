pub(crate) mod app;
pub(crate) mod auth;

pub(crate) use app::*;
pub(crate) use auth::*;
