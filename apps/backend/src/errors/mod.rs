//! Error handling for the Photoshare backend.

pub mod error_code;
pub mod store;

pub use error_code::ErrorCode;
pub use store::StoreError;
