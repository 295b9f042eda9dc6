//! Infrastructure layer - counter store adapters and state assembly.

pub mod redis;
pub mod state;
