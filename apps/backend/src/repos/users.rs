//! In-memory account store.
//!
//! Emails and usernames are unique across accounts. Emails compare
//! case-insensitively and are stored lowercased.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub age: u8,
    pub password_hash: String,
}

/// Fields of an account being registered; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub age: u8,
    pub password_hash: String,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<Uuid, UserRecord>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, new: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users.write();
        let email = new.email.to_lowercase();
        ensure_unique(&users, None, &email, &new.username)?;

        let record = UserRecord {
            id: Uuid::new_v4(),
            username: new.username,
            email,
            age: new.age,
            password_hash: new.password_hash,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    pub fn get(&self, id: Uuid) -> Option<UserRecord> {
        self.users.read().get(&id).cloned()
    }

    pub fn find_by_email(&self, email: &str) -> Option<UserRecord> {
        let email = email.to_lowercase();
        self.users
            .read()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    /// Change an account's email and username.
    pub fn update(&self, id: Uuid, email: &str, username: &str) -> Result<UserRecord, AppError> {
        let mut users = self.users.write();
        let email = email.to_lowercase();
        ensure_unique(&users, Some(id), &email, username)?;

        let record = users.get_mut(&id).ok_or(AppError::AccountNotFound)?;
        record.email = email;
        record.username = username.to_string();
        Ok(record.clone())
    }

    pub fn delete(&self, id: Uuid) -> Result<UserRecord, AppError> {
        self.users.write().remove(&id).ok_or(AppError::AccountNotFound)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn ensure_unique(
    users: &HashMap<Uuid, UserRecord>,
    except: Option<Uuid>,
    email: &str,
    username: &str,
) -> Result<(), AppError> {
    for user in users.values().filter(|u| Some(u.id) != except) {
        if user.email == email {
            return Err(AppError::bad_request("Email is already registered"));
        }
        if user.username == username {
            return Err(AppError::bad_request("Username is already taken"));
        }
    }
    Ok(())
}
