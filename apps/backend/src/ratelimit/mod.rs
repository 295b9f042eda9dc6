//! Fixed-window request counting over a shared counter store.

pub mod key;
pub mod store;
pub mod window;

pub use key::{counter_key, Identifier};
pub use store::{CounterStore, MemoryCounterStore};
pub use window::{retry_after_secs, Decision, FixedWindowLimiter, RateLimitConfig};
