pub mod jwt_extract;
pub mod rate_limit;
pub mod request_trace;
pub mod require_owner;
pub mod structured_logger;

pub use jwt_extract::JwtExtract;
pub use rate_limit::RateLimit;
pub use request_trace::RequestTrace;
pub use require_owner::RequireOwner;
pub use structured_logger::StructuredLogger;
