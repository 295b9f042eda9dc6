//! Token claims and the identity derived from them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried inside issued access tokens.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user) identifier
    pub sub: Uuid,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// The caller's identity once its token has been verified.
///
/// Inserted into request extensions by the `JwtExtract` middleware and
/// dropped with the request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifiedIdentity {
    pub subject_id: Uuid,
    pub email: String,
    pub issued_at: i64,
    pub expires_at: i64,
}

impl From<Claims> for VerifiedIdentity {
    fn from(claims: Claims) -> Self {
        Self {
            subject_id: claims.sub,
            email: claims.email,
            issued_at: claims.iat,
            expires_at: claims.exp,
        }
    }
}
