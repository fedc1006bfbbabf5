use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Order row. Read-only here; orders are written by the ordering subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    #[serde(skip_serializing)]
    pub user_id: Uuid,
    pub customer_id: Uuid,
    pub order_number: String,
    pub status: String,
    pub payment_status: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub sgst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub igst: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount_paid: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Order {
    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("cancelled")
    }

    pub fn is_paid(&self) -> bool {
        self.payment_status.eq_ignore_ascii_case("paid")
    }

    pub fn total_tax(&self) -> Decimal {
        self.cgst + self.sgst + self.igst
    }
}
