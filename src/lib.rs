// Library surface for the binary and the integration tests.
// The terminal widgets stay in main.rs so the core has no drawing code.
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod logging;
pub mod notation;
pub mod ranking;
pub mod runtime;
pub mod seed;
pub mod session;
pub mod store;
pub mod summary;
pub mod util;
pub mod verify;
