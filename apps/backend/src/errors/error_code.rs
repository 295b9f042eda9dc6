//! Error codes for the Photoshare backend API.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in HTTP responses.

use core::fmt;

/// Centralized error codes for the Photoshare backend API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Credentials
    /// No Authorization header on a protected route
    UnauthorizedMissingBearer,
    /// Authorization header present but not `Bearer <token>`
    UnauthorizedMalformedBearer,
    /// Token failed signature, algorithm or format checks
    UnauthorizedInvalidJwt,
    /// Token is past its expiry
    UnauthorizedExpiredJwt,
    /// Login email and password do not match an account
    UnauthorizedInvalidCredentials,

    // Authorization
    /// Caller does not own the resource
    Forbidden,
    /// Resource id in the path is not a valid id
    InvalidResourceId,
    /// Request body or parameters rejected
    BadRequest,

    // Resource Not Found
    PhotoNotFound,
    CommentNotFound,
    SocialMediaNotFound,
    /// The caller's own account no longer exists
    AccountNotFound,

    // Quota
    /// Fixed-window quota exhausted
    RateLimited,

    // System Errors
    /// Shared store failed at runtime
    StoreUnavailable,
    /// Internal server error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedMalformedBearer => "UNAUTHORIZED_MALFORMED_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::UnauthorizedInvalidCredentials => "UNAUTHORIZED_INVALID_CREDENTIALS",

            Self::Forbidden => "FORBIDDEN",
            Self::InvalidResourceId => "INVALID_RESOURCE_ID",
            Self::BadRequest => "BAD_REQUEST",

            Self::PhotoNotFound => "PHOTO_NOT_FOUND",
            Self::CommentNotFound => "COMMENT_NOT_FOUND",
            Self::SocialMediaNotFound => "SOCIAL_MEDIA_NOT_FOUND",
            Self::AccountNotFound => "ACCOUNT_NOT_FOUND",

            Self::RateLimited => "RATE_LIMITED",

            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const ALL: [ErrorCode; 16] = [
        ErrorCode::UnauthorizedMissingBearer,
        ErrorCode::UnauthorizedMalformedBearer,
        ErrorCode::UnauthorizedInvalidJwt,
        ErrorCode::UnauthorizedExpiredJwt,
        ErrorCode::UnauthorizedInvalidCredentials,
        ErrorCode::Forbidden,
        ErrorCode::InvalidResourceId,
        ErrorCode::BadRequest,
        ErrorCode::PhotoNotFound,
        ErrorCode::CommentNotFound,
        ErrorCode::SocialMediaNotFound,
        ErrorCode::AccountNotFound,
        ErrorCode::RateLimited,
        ErrorCode::StoreUnavailable,
        ErrorCode::Internal,
        ErrorCode::ConfigError,
    ];

    #[test]
    fn test_error_code_strings() {
        assert_eq!(
            ErrorCode::UnauthorizedMissingBearer.as_str(),
            "UNAUTHORIZED_MISSING_BEARER"
        );
        assert_eq!(
            ErrorCode::UnauthorizedExpiredJwt.as_str(),
            "UNAUTHORIZED_EXPIRED_JWT"
        );
        assert_eq!(ErrorCode::InvalidResourceId.as_str(), "INVALID_RESOURCE_ID");
        assert_eq!(ErrorCode::RateLimited.as_str(), "RATE_LIMITED");
        assert_eq!(ErrorCode::StoreUnavailable.as_str(), "STORE_UNAVAILABLE");
    }

    #[test]
    fn test_codes_are_unique_and_screaming_snake() {
        let mut seen = HashSet::new();
        for code in ALL {
            let s = code.as_str();
            assert!(seen.insert(s), "duplicate error code {s}");
            assert!(
                s.chars().all(|c| c.is_ascii_uppercase() || c == '_'),
                "{s} is not SCREAMING_SNAKE_CASE"
            );
        }
    }

    #[test]
    fn test_display_trait() {
        assert_eq!(format!("{}", ErrorCode::Forbidden), "FORBIDDEN");
        assert_eq!(format!("{}", ErrorCode::PhotoNotFound), "PHOTO_NOT_FOUND");
    }
}
