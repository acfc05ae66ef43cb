pub(crate) mod app_state;
pub(crate) mod deep_link;
pub(crate) mod logging;
pub(crate) mod window;
