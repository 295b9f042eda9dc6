#![allow(dead_code)]

pub mod app_builder;
pub mod auth;
pub mod mailer;
pub mod stores;

pub use app_builder::create_test_app;

// Logging is auto-installed for every test binary that declares `mod support;`
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}
