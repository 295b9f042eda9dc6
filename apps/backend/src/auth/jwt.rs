use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use uuid::Uuid;

use crate::auth::claims::{Claims, VerifiedIdentity};
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Why a presented token was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("signature or signing method does not match")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("token is malformed")]
    Malformed,
}

/// Issues and verifies signed identity tokens.
///
/// Holds its keys and algorithm explicitly; nothing is read from process
/// state, so independent instances can coexist in concurrent tests.
#[derive(Clone)]
pub struct TokenService {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            algorithm: security.algorithm,
            encoding: EncodingKey::from_secret(&security.jwt_secret),
            decoding: DecodingKey::from_secret(&security.jwt_secret),
            ttl: security.token_ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for the subject, valid for the configured TTL from now.
    pub fn issue(&self, subject_id: Uuid, email: &str) -> Result<String, AppError> {
        self.issue_at(subject_id, email, SystemTime::now())
    }

    /// Mint a token as if issued at `now`.
    pub fn issue_at(
        &self,
        subject_id: Uuid,
        email: &str,
        now: SystemTime,
    ) -> Result<String, AppError> {
        let iat = now
            .duration_since(UNIX_EPOCH)
            .ok()
            .and_then(|since| i64::try_from(since.as_secs()).ok())
            .ok_or_else(|| AppError::internal("Failed to get current time"))?;
        let exp = i64::try_from(self.ttl.as_secs())
            .ok()
            .and_then(|ttl| iat.checked_add(ttl))
            .ok_or_else(|| AppError::internal("Token lifetime is out of range"))?;

        let claims = Claims {
            sub: subject_id,
            email: email.to_string(),
            iat,
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
    }

    /// Verify a token and return the identity it carries.
    ///
    /// The algorithm is pinned to the configured one; a token whose header
    /// names any other algorithm is rejected as `InvalidSignature`.
    pub fn verify(&self, token: &str) -> Result<VerifiedIdentity, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.into())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => TokenError::InvalidSignature,
                _ => TokenError::Malformed,
            })
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
