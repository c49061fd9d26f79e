//! Purchase model: a quantity of one product sold to one client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Purchase {
    pub id: Uuid,
    pub client_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub notes: Option<String>,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePurchase {
    pub client_id: Uuid,
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub notes: Option<String>,
}

/// Purchase joined with its product for display.
///
/// `unit_price` is the product's *current* net price, not a snapshot
/// taken at purchase time; editing a product's price retroactively
/// changes the displayed totals of its past purchases.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PurchaseDetail {
    pub id: Uuid,
    pub client_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn create_purchase_rejects_zero_quantity() {
        let purchase = CreatePurchase {
            client_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 0,
            notes: None,
        };
        assert!(purchase.validate().is_err());
    }

    #[test]
    fn create_purchase_accepts_positive_quantity() {
        let purchase = CreatePurchase {
            client_id: Uuid::new_v4(),
            product_id: Uuid::new_v4(),
            quantity: 3,
            notes: Some("rush order".to_string()),
        };
        assert!(purchase.validate().is_ok());
    }

    #[test]
    fn purchase_detail_serializes_decimal_totals() {
        let detail = PurchaseDetail {
            id: Uuid::nil(),
            client_id: Uuid::nil(),
            product_id: Uuid::nil(),
            product_name: "Widget".to_string(),
            quantity: 4,
            unit_price: dec!(10.00),
            line_total: dec!(40.00),
            notes: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["line_total"], "40.00");
    }
}
