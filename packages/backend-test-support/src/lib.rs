//! Backend test support utilities
//!
//! Shared helpers for the backend's unit and integration tests: unified
//! logging initialization and assertions over the error body contract.

pub mod error_body;
pub mod logging;
