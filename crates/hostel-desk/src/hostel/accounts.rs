use serde::Deserialize;
use sha2::{Digest, Sha256};

pub const DEFAULT_SUBSCRIPTION: &str = "trial";

/// Email/password pair submitted at signup or login.
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn normalized_email(&self) -> String {
        normalize_email(&self.email)
    }

    pub fn validate(&self) -> Result<(), String> {
        let email = self.normalized_email();
        if email.is_empty() || !email.contains('@') {
            return Err(format!("'{}' is not a usable email address", self.email));
        }
        if self.password.is_empty() {
            return Err("password must not be empty".to_string());
        }
        Ok(())
    }
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

/// Lowercase hex SHA-256 of the password.
pub fn hash_password(password: &str) -> String {
    format!("{:x}", Sha256::digest(password.as_bytes()))
}

pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    hash_password(password) == stored_hash
}
