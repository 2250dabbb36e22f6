//! Password storage schemes
//!
//! `plaintext` stores the password as given and compares it directly. It
//! exists so existing credential tables keep working and is the default;
//! deployments should set `PASSWORD_SCHEME=argon2`.

use anyhow::Result;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use std::str::FromStr;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PasswordScheme {
    #[default]
    Plaintext,
    Argon2,
}

impl PasswordScheme {
    /// Read `PASSWORD_SCHEME` (`plaintext` or `argon2`, default `plaintext`)
    pub fn from_env() -> Result<Self> {
        let scheme = match std::env::var("PASSWORD_SCHEME") {
            Ok(value) => value.parse()?,
            Err(_) => Self::default(),
        };

        if scheme == PasswordScheme::Plaintext {
            warn!("Passwords are stored in plaintext; set PASSWORD_SCHEME=argon2 to hash them");
        }

        Ok(scheme)
    }

    /// Turn a password into its stored form
    pub fn seal(&self, password: &str) -> Result<String> {
        match self {
            PasswordScheme::Plaintext => Ok(password.to_string()),
            PasswordScheme::Argon2 => {
                let salt = SaltString::generate(&mut rand::thread_rng());
                let hash = Argon2::default()
                    .hash_password(password.as_bytes(), &salt)
                    .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?
                    .to_string();
                Ok(hash)
            }
        }
    }

    /// Check a candidate password against its stored form
    pub fn verify(&self, password: &str, stored: &str) -> bool {
        match self {
            PasswordScheme::Plaintext => password == stored,
            PasswordScheme::Argon2 => match PasswordHash::new(stored) {
                Ok(parsed) => Argon2::default()
                    .verify_password(password.as_bytes(), &parsed)
                    .is_ok(),
                Err(_) => false,
            },
        }
    }
}

impl FromStr for PasswordScheme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plaintext" | "plain" => Ok(PasswordScheme::Plaintext),
            "argon2" => Ok(PasswordScheme::Argon2),
            other => Err(anyhow::anyhow!("Unknown password scheme: {}", other)),
        }
    }
}
