use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::database::Customer;

/// External shape of a customer. Both id spellings and both alias pairs
/// (`gstin`/`gstNumber`, `totalOrders`/`totalPurchases`) are always present.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub id: String,
    #[serde(rename = "_id")]
    pub legacy_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub company: String,
    pub address: String,
    pub state: String,
    pub city: String,
    pub pincode: String,
    pub gstin: String,
    pub gst_number: String,
    pub is_inter_state: bool,
    pub is_active: bool,
    pub total_orders: i64,
    pub total_purchases: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
    pub last_order_date: Option<DateTime<Utc>>,
    pub notes: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Summary returned after a delete.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeletedCustomerDto {
    pub id: String,
    #[serde(rename = "_id")]
    pub legacy_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Normalize a stored record into its external shape. Does not touch the input.
pub fn to_external_shape(customer: &Customer) -> CustomerDto {
    let id = customer.id.to_string();
    let gstin = text(&customer.gstin);

    CustomerDto {
        legacy_id: id.clone(),
        id,
        name: customer.name.clone(),
        phone: customer.phone.clone(),
        email: text(&customer.email),
        company: text(&customer.company),
        address: text(&customer.address),
        state: text(&customer.state),
        city: text(&customer.city),
        pincode: text(&customer.pincode),
        gst_number: gstin.clone(),
        gstin,
        is_inter_state: customer.is_inter_state,
        is_active: customer.is_active,
        total_orders: customer.total_orders,
        total_purchases: customer.total_orders,
        total_spent: customer.total_spent,
        last_order_date: customer.last_order_date,
        notes: text(&customer.notes),
        tags: customer.tags.clone(),
        created_at: customer.created_at,
        updated_at: customer.updated_at,
    }
}

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        to_external_shape(customer)
    }
}

impl From<&Customer> for DeletedCustomerDto {
    fn from(customer: &Customer) -> Self {
        let id = customer.id.to_string();
        Self {
            legacy_id: id.clone(),
            id,
            name: customer.name.clone(),
            phone: customer.phone.clone(),
            email: text(&customer.email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use uuid::Uuid;

    #[test]
    fn mirrors_aliases_and_defaults_blanks() {
        let mut customer = Customer::new(Uuid::new_v4(), "Acme".into(), "9876543210".into());
        customer.gstin = Some("27AAPFU0939F1ZV".into());
        customer.total_orders = 4;
        let before = customer.clone();

        let value = serde_json::to_value(to_external_shape(&customer)).unwrap();

        assert_eq!(customer, before);
        assert_eq!(value["id"], json!(customer.id.to_string()));
        assert_eq!(value["_id"], value["id"]);
        assert_eq!(value["gstin"], json!("27AAPFU0939F1ZV"));
        assert_eq!(value["gstNumber"], json!("27AAPFU0939F1ZV"));
        assert_eq!(value["totalOrders"], json!(4));
        assert_eq!(value["totalPurchases"], json!(4));
        assert_eq!(value["totalSpent"], json!(0.0));
        assert_eq!(value["email"], json!(""));
        assert_eq!(value["notes"], json!(""));
        assert_eq!(value["tags"], json!([]));
        assert_eq!(value["isActive"], json!(true));
        assert!(value["lastOrderDate"].is_null());
    }
}
