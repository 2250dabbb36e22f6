//! API models for request and response payloads
//!
//! Each entity has a view type, which is both the row read from storage
//! (computed columns included) and the JSON returned to clients, and an input
//! type accepted on create and update. JSON uses camelCase field names.

use bigdecimal::BigDecimal;

pub mod client;
pub mod device;
pub mod repair_order;
pub mod service;
pub mod technician;

pub use client::{Client, ClientInput};
pub use device::{Device, DeviceInput};
pub use repair_order::{
    CreateOrderInput, NewOrder, OrderChanges, OrderStatistics, OrderStatus, RepairOrder,
    StatusUpdate, UpdateOrderInput,
};
pub use service::{PriceRange, PopularQuery, Service, ServiceInput};
pub use technician::{Technician, TechnicianInput};

/// Largest amount a `NUMERIC(12, 2)` column holds
const MONEY_MAX: i64 = 10_000_000_000;

/// Round an amount to cents, rejecting negative or oversized values
pub fn normalize_money(field: &str, value: &BigDecimal) -> Result<BigDecimal, String> {
    if *value < BigDecimal::from(0) {
        return Err(format!("{} must not be negative", field));
    }

    let rounded = value.round(2).with_scale(2);
    if rounded >= BigDecimal::from(MONEY_MAX) {
        return Err(format!("{} is too large", field));
    }

    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_normalize_money() {
        let value = BigDecimal::from_str("19.999").unwrap();
        assert_eq!(normalize_money("Price", &value).unwrap().to_string(), "20.00");

        let whole = BigDecimal::from(15);
        assert_eq!(normalize_money("Price", &whole).unwrap().to_string(), "15.00");

        let negative = BigDecimal::from_str("-0.01").unwrap();
        assert!(normalize_money("Price", &negative).is_err());

        let huge = BigDecimal::from_str("10000000000").unwrap();
        assert!(normalize_money("Price", &huge).is_err());
    }
}
