//! Service catalog model

use bigdecimal::BigDecimal;
use common::validation;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::normalize_money;

/// A repair service offered at a fixed price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: BigDecimal,
    /// Repair orders placed for this service
    pub orders_count: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: BigDecimal,
}

impl ServiceInput {
    /// Validate and round the price to cents
    pub fn normalized(mut self) -> Result<Self, String> {
        validation::validate_required("Name", &self.name, 100)?;
        validation::validate_length("Description", &self.description, 2000)?;
        self.price = normalize_money("Price", &self.price)?;
        Ok(self)
    }
}

/// `GET /api/services/price-range?minPrice=&maxPrice=`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min_price: BigDecimal,
    pub max_price: BigDecimal,
}

impl PriceRange {
    pub fn validate(&self) -> Result<(), String> {
        let zero = BigDecimal::from(0);
        if self.min_price < zero || self.max_price < zero {
            return Err("Price bounds must not be negative".to_string());
        }
        if self.min_price > self.max_price {
            return Err("minPrice must not exceed maxPrice".to_string());
        }
        Ok(())
    }
}

/// `GET /api/services/popular?top=`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PopularQuery {
    pub top: Option<i64>,
}

impl PopularQuery {
    pub const DEFAULT_TOP: i64 = 5;
    pub const MAX_TOP: i64 = 100;

    pub fn top(&self) -> Result<i64, String> {
        let top = self.top.unwrap_or(Self::DEFAULT_TOP);
        if !(1..=Self::MAX_TOP).contains(&top) {
            return Err(format!("top must be between 1 and {}", Self::MAX_TOP));
        }
        Ok(top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_price_accepts_string_or_number() {
        let from_string: ServiceInput =
            serde_json::from_str(r#"{"name":"Screen","price":"49.90"}"#).unwrap();
        let from_number: ServiceInput =
            serde_json::from_str(r#"{"name":"Screen","price":49}"#).unwrap();

        assert_eq!(from_string.normalized().unwrap().price.to_string(), "49.90");
        assert_eq!(from_number.normalized().unwrap().price.to_string(), "49.00");
    }

    #[test]
    fn test_price_range_validation() {
        let range = |min: &str, max: &str| PriceRange {
            min_price: BigDecimal::from_str(min).unwrap(),
            max_price: BigDecimal::from_str(max).unwrap(),
        };

        assert!(range("10", "10").validate().is_ok());
        assert!(range("20", "10").validate().is_err());
        assert!(range("-1", "10").validate().is_err());
    }

    #[test]
    fn test_popular_top() {
        assert_eq!(PopularQuery::default().top(), Ok(5));
        assert_eq!(PopularQuery { top: Some(2) }.top(), Ok(2));
        assert!(PopularQuery { top: Some(0) }.top().is_err());
        assert!(PopularQuery { top: Some(101) }.top().is_err());
    }
}
