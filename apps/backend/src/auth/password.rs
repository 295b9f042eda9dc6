//! Password hashing behind a small trait, so the account routes never see
//! the scheme in use.

use std::fmt::Write as _;

use sha2::{Digest, Sha256};
use uuid::Uuid;

const SCHEME: &str = "sha256";
const DEFAULT_ROUNDS: u32 = 10_000;

pub trait PasswordHasher: Send + Sync + 'static {
    /// Hash a plaintext password into a self-describing string.
    fn hash(&self, password: &str) -> String;

    /// Whether `password` matches a string produced by [`hash`](Self::hash).
    /// Anything unparseable is a mismatch.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Salted, iterated SHA-256.
///
/// Stored as `sha256$<rounds>$<salt>$<digest>`, hex-encoded.
#[derive(Debug, Clone, Copy)]
pub struct Sha256Hasher {
    rounds: u32,
}

impl Sha256Hasher {
    pub fn new(rounds: u32) -> Self {
        Self {
            rounds: rounds.max(1),
        }
    }

    fn digest(rounds: u32, salt: &str, password: &str) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(password.as_bytes());

        let mut digest = [0u8; 32];
        digest.copy_from_slice(&hasher.finalize());

        for _ in 1..rounds {
            let mut hasher = Sha256::new();
            hasher.update(digest);
            hasher.update(salt.as_bytes());
            digest.copy_from_slice(&hasher.finalize());
        }
        digest
    }
}

impl Default for Sha256Hasher {
    fn default() -> Self {
        Self::new(DEFAULT_ROUNDS)
    }
}

impl PasswordHasher for Sha256Hasher {
    fn hash(&self, password: &str) -> String {
        let salt = Uuid::new_v4().simple().to_string();
        let digest = Self::digest(self.rounds, &salt, password);
        format!("{SCHEME}${}${salt}${}", self.rounds, to_hex(&digest))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let mut parts = hash.split('$');
        let (Some(SCHEME), Some(rounds), Some(salt), Some(expected), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return false;
        };
        let Ok(rounds) = rounds.parse::<u32>() else {
            return false;
        };

        let actual = to_hex(&Self::digest(rounds.max(1), salt, password));
        constant_time_eq(actual.as_bytes(), expected.as_bytes())
    }
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().fold(String::with_capacity(bytes.len() * 2), |mut out, b| {
        let _ = write!(out, "{b:02x}");
        out
    })
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Sha256Hasher {
        Sha256Hasher::new(10)
    }

    #[test]
    fn hash_verifies_only_the_original_password() {
        let hash = hasher().hash("password123");
        assert!(hash.starts_with("sha256$10$"));
        assert!(hasher().verify("password123", &hash));
        assert!(!hasher().verify("password124", &hash));
    }

    #[test]
    fn same_password_gets_a_fresh_salt() {
        let first = hasher().hash("password123");
        let second = hasher().hash("password123");
        assert_ne!(first, second);
        assert!(hasher().verify("password123", &second));
    }

    #[test]
    fn rounds_come_from_the_stored_hash() {
        let hash = Sha256Hasher::new(3).hash("secret");
        assert!(Sha256Hasher::new(500).verify("secret", &hash));
    }

    #[test]
    fn garbage_hashes_never_match() {
        for stored in ["", "sha256$x$salt$00", "md5$1$salt$00", "sha256$1$salt$00$extra"] {
            assert!(!hasher().verify("secret", stored), "{stored}");
        }
    }
}
