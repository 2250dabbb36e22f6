//! Client model

use common::validation;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A customer of the shop
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    /// Number of devices registered to the client
    pub devices_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

impl ClientInput {
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_required("FirstName", &self.first_name, 100)?;
        validation::validate_required("LastName", &self.last_name, 100)?;
        validation::validate_phone(&self.phone)?;
        validation::validate_optional_email(&self.email)?;
        Ok(())
    }
}
