//! Technician model

use common::validation;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Technician {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub specialization: String,
    pub phone: String,
    pub is_active: bool,
    pub orders_count: i64,
    /// Assigned orders not yet completed
    pub active_orders_count: i64,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechnicianInput {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub specialization: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

impl TechnicianInput {
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_required("FirstName", &self.first_name, 100)?;
        validation::validate_required("LastName", &self.last_name, 100)?;
        validation::validate_length("Specialization", &self.specialization, 100)?;
        validation::validate_phone(&self.phone)?;
        Ok(())
    }
}
