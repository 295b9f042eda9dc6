//! Record stores behind the route handlers.

pub mod resources;
pub mod users;

pub use resources::{MemoryResourceStore, ResourceRecord};
pub use users::{MemoryUserStore, NewUser, UserRecord};
