use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Stored customer row. Aliased output fields (`gstNumber`, `totalPurchases`) are
/// produced by the response formatter; only the canonical columns live here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub pincode: Option<String>,
    pub gstin: Option<String>,
    pub is_inter_state: bool,
    pub is_active: bool,
    pub total_orders: i64,
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// A fresh record with zeroed accumulators.
    pub fn new(user_id: Uuid, name: String, phone: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            name,
            phone,
            email: None,
            company: None,
            address: None,
            state: None,
            city: None,
            pincode: None,
            gstin: None,
            is_inter_state: false,
            is_active: true,
            total_orders: 0,
            total_spent: Decimal::ZERO,
            last_order_date: None,
            notes: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}
