//! Token helpers for tests

use std::time::{Duration, SystemTime};

use photoshare_backend::auth::jwt::TokenService;
use photoshare_backend::state::security_config::SecurityConfig;
use uuid::Uuid;

pub const SECRET: &str = "test_secret_key_for_testing_purposes_only";

pub fn security() -> SecurityConfig {
    SecurityConfig::new(SECRET.as_bytes())
}

pub fn tokens() -> TokenService {
    TokenService::new(&security())
}

/// Full Authorization header value for `user`.
pub fn bearer(user: Uuid) -> String {
    format!(
        "Bearer {}",
        tokens()
            .issue(user, &format!("{user}@example.com"))
            .expect("should mint token successfully")
    )
}

/// Authorization header value carrying a token that expired an hour ago.
pub fn expired_bearer(user: Uuid) -> String {
    let issued = SystemTime::now() - tokens().ttl() - Duration::from_secs(3600);
    format!(
        "Bearer {}",
        tokens()
            .issue_at(user, "expired@example.com", issued)
            .expect("should mint token successfully")
    )
}

/// Authorization header value signed with a different secret.
pub fn foreign_bearer(user: Uuid) -> String {
    let other = TokenService::new(&SecurityConfig::new(
        "another_secret_key_that_is_long_enough_too".as_bytes(),
    ));
    format!(
        "Bearer {}",
        other
            .issue(user, "foreign@example.com")
            .expect("should mint token successfully")
    )
}
