pub mod claims;
pub mod jwt;
pub mod password;

pub use claims::{Claims, VerifiedIdentity};
pub use jwt::{TokenError, TokenService};
pub use password::{PasswordHasher, Sha256Hasher};
