//! Repair order model

use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use common::{gate::OrderOwnership, validation};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::{fmt, str::FromStr};
use thiserror::Error;

use super::normalize_money;

/// Where an order is in the repair workflow
///
/// Any status may follow any other; only the value set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Received,
    Diagnosing,
    InProgress,
    Waiting,
    Ready,
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Received,
        OrderStatus::Diagnosing,
        OrderStatus::InProgress,
        OrderStatus::Waiting,
        OrderStatus::Ready,
        OrderStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Received => "Received",
            OrderStatus::Diagnosing => "Diagnosing",
            OrderStatus::InProgress => "InProgress",
            OrderStatus::Waiting => "Waiting",
            OrderStatus::Ready => "Ready",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

impl TryFrom<String> for OrderStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A repair order joined with the names of everything it points at
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct RepairOrder {
    pub id: i32,
    pub created_date: DateTime<Utc>,
    /// Set exactly when `status` is `Completed`
    pub completed_date: Option<DateTime<Utc>>,
    pub total_cost: BigDecimal,
    #[sqlx(try_from = "String")]
    pub status: OrderStatus,
    pub device_id: i32,
    pub service_id: i32,
    pub technician_id: i32,
    /// "brand model" of the device
    pub device_info: String,
    pub service_name: String,
    pub technician_name: String,
    pub client_name: String,
    pub client_id: i32,
}

impl OrderOwnership for RepairOrder {
    fn assigned_technician_id(&self) -> i32 {
        self.technician_id
    }

    fn owning_client_id(&self) -> i32 {
        self.client_id
    }
}

/// Body of `POST /api/repairorders`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderInput {
    pub device_id: i32,
    pub service_id: i32,
    pub technician_id: i32,
    pub total_cost: Option<BigDecimal>,
}

impl CreateOrderInput {
    pub fn validate(&self) -> Result<(), String> {
        validation::validate_id("DeviceId", self.device_id)?;
        validation::validate_id("ServiceId", self.service_id)?;
        validation::validate_id("TechnicianId", self.technician_id)?;
        Ok(())
    }

    /// The cost to store, zero when none was given
    pub fn total_cost(&self) -> Result<BigDecimal, String> {
        match &self.total_cost {
            Some(cost) => normalize_money("TotalCost", cost),
            None => normalize_money("TotalCost", &BigDecimal::from(0)),
        }
    }
}

/// Body of `PUT /api/repairorders/{id}`; omitted fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderInput {
    pub status: Option<String>,
    pub total_cost: Option<BigDecimal>,
    pub service_id: Option<i32>,
    pub technician_id: Option<i32>,
}

/// Body of `PATCH /api/repairorders/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Row to insert
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub device_id: i32,
    pub service_id: i32,
    pub technician_id: i32,
    pub total_cost: BigDecimal,
    pub status: OrderStatus,
    pub created_date: DateTime<Utc>,
}

/// Complete set of mutable columns written by an update
#[derive(Debug, Clone)]
pub struct OrderChanges {
    pub status: OrderStatus,
    pub completed_date: Option<DateTime<Utc>>,
    pub total_cost: BigDecimal,
    pub service_id: i32,
    pub technician_id: i32,
}

/// Shop-wide order figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatistics {
    pub total_orders: i64,
    pub completed_orders: i64,
    pub in_progress_orders: i64,
    /// Sum of `total_cost` over completed orders
    pub total_revenue: BigDecimal,
}
