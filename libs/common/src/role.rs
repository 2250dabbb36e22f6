//! User roles
//!
//! The role set is closed: anything outside `Admin`, `Technician` and `User`
//! is rejected rather than coerced.

use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Role carried by every account and token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Technician,
    #[default]
    User,
}

/// Endpoints restricted to administrators
pub const ADMIN: &[Role] = &[Role::Admin];
/// Endpoints open to shop staff
pub const STAFF: &[Role] = &[Role::Admin, Role::Technician];
/// Endpoints open to any authenticated account
pub const ANY: &[Role] = &[Role::Admin, Role::Technician, Role::User];

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Technician => "Technician",
            Role::User => "User",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(Role::Admin),
            "Technician" => Ok(Role::Technician),
            "User" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

// Used by sqlx when decoding the `role` column.
impl TryFrom<String> for Role {
    type Error = UnknownRole;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
