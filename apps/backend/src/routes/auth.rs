//! Account registration and login.
//!
//! Both routes are open: they sit outside identity verification, and login
//! is where identity tokens are minted.

use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::AppError;
use crate::notify::WelcomeEmail;
use crate::repos::{NewUser, UserRecord};
use crate::routes::SuccessBody;
use crate::state::app_state::AppState;

pub const MIN_AGE: u8 = 9;
pub const MAX_AGE: u8 = 100;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub age: i64,
    pub email: String,
    pub password: String,
    pub username: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccountBody {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub age: u8,
}

impl From<UserRecord> for AccountBody {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            age: user.age,
        }
    }
}

#[derive(Debug, Serialize)]
struct TokenBody {
    token: String,
}

async fn register(
    body: web::Json<RegisterRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    let age = validate_age(req.age)?;
    validate_email(&req.email)?;
    validate_password(&req.password)?;
    let username = validate_username(&req.username)?;

    let accounts = &app_state.accounts;
    let user = accounts.users.create(NewUser {
        username: username.to_string(),
        email: req.email.trim().to_string(),
        age,
        password_hash: accounts.hasher.hash(&req.password),
    })?;

    info!(user_id = %user.id, "account registered");
    accounts.notifier.enqueue(WelcomeEmail {
        email: user.email.clone(),
        username: user.username.clone(),
    });

    Ok(HttpResponse::Created().json(SuccessBody::with_data(
        "User registered successfully",
        AccountBody::from(user),
    )))
}

async fn login(
    body: web::Json<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let req = body.into_inner();
    validate_email(&req.email)?;

    let accounts = &app_state.accounts;
    // Unknown email and wrong password answer the same way.
    let user = accounts
        .users
        .find_by_email(req.email.trim())
        .filter(|user| accounts.hasher.verify(&req.password, &user.password_hash))
        .ok_or_else(|| {
            debug!("login rejected");
            AppError::InvalidLogin
        })?;

    let token = app_state.tokens.issue(user.id, &user.email)?;
    info!(user_id = %user.id, "login succeeded");

    Ok(HttpResponse::Ok().json(SuccessBody::with_data(
        "Login successful",
        TokenBody { token },
    )))
}

fn validate_age(age: i64) -> Result<u8, AppError> {
    u8::try_from(age)
        .ok()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or_else(|| {
            AppError::bad_request(format!("Age must be between {MIN_AGE} and {MAX_AGE}"))
        })
}

/// Loose shape check: one `@` with text on both sides and a dotted domain.
pub fn validate_email(email: &str) -> Result<(), AppError> {
    let email = email.trim();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && !email.contains(char::is_whitespace)
                && domain
                    .split_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(AppError::bad_request("Email must be a valid email address"))
    }
}

fn validate_password(password: &str) -> Result<(), AppError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

pub fn validate_username(username: &str) -> Result<&str, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::bad_request("Username is required"));
    }
    Ok(username)
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/register").route(web::post().to(register)));
    cfg.service(web::resource("/login").route(web::post().to(login)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ages_outside_the_range_are_rejected() {
        assert_eq!(validate_age(9).unwrap(), 9);
        assert_eq!(validate_age(100).unwrap(), 100);
        for age in [-1, 0, 8, 101, 256, i64::MAX] {
            assert!(validate_age(age).is_err(), "{age}");
        }
    }

    #[test]
    fn email_shape() {
        for ok in ["a@b.co", "john.doe@example.com", " ada@example.com "] {
            assert!(validate_email(ok).is_ok(), "{ok}");
        }
        for bad in ["", "ada", "@example.com", "ada@", "ada@example", "a@b@c.com", "a b@c.com"] {
            assert!(validate_email(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn short_passwords_and_blank_usernames_are_rejected() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_username("   ").is_err());
        assert_eq!(validate_username(" ada ").unwrap(), "ada");
    }
}
