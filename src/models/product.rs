//! Product catalog model with running sold-quantity counter.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub net_price: Decimal,
    /// Running total of units sold, kept in sync transactionally on
    /// purchase creation and deletion.
    pub sold_quantity: i32,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub net_price: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, Default)]
pub struct UpdateProduct {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub net_price: Option<Decimal>,
    pub description: Option<String>,
}

/// Catalog entry for selector controls (dashboard product filter).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProductRef {
    pub id: Uuid,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn product_serializes_decimal_price() {
        let product = Product {
            id: Uuid::nil(),
            name: "Widget".to_string(),
            net_price: dec!(19.99),
            sold_quantity: 0,
            description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&product).unwrap();
        assert_eq!(json["net_price"], "19.99");
    }

    #[test]
    fn create_product_rejects_empty_name() {
        let product = CreateProduct {
            name: String::new(),
            net_price: dec!(1.00),
            description: None,
        };
        assert!(product.validate().is_err());
    }
}
