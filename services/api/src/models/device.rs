//! Device model

use common::validation;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A device brought in by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub id: i32,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub device_type: String,
    pub brand: String,
    pub model: String,
    pub serial_number: String,
    pub problem_description: String,
    pub client_id: i32,
    /// Owner's first and last name
    pub client_name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInput {
    #[serde(rename = "type")]
    pub device_type: String,
    pub brand: String,
    pub model: String,
    #[serde(default)]
    pub serial_number: String,
    #[serde(default)]
    pub problem_description: String,
    pub client_id: i32,
}

impl DeviceInput {
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_required("Type", &self.device_type, 100)?;
        validation::validate_required("Brand", &self.brand, 100)?;
        validation::validate_required("Model", &self.model, 100)?;
        validation::validate_length("SerialNumber", &self.serial_number, 100)?;
        validation::validate_length("ProblemDescription", &self.problem_description, 2000)?;
        validation::validate_id("ClientId", self.client_id)?;
        Ok(())
    }
}
