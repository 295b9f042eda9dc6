//! Resource ownership checks.

pub mod kind;
pub mod registry;

pub use kind::ResourceKind;
pub use registry::{OwnershipLookup, OwnershipRegistry};
