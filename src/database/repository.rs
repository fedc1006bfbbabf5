use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::{Customer, Order};

/// Column writes for an update. `None` leaves a column untouched; for nullable
/// columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub company: Option<Option<String>>,
    pub address: Option<Option<String>>,
    pub state: Option<Option<String>>,
    pub city: Option<Option<String>>,
    pub pincode: Option<Option<String>>,
    pub gstin: Option<Option<String>>,
    pub notes: Option<Option<String>>,
    pub is_inter_state: Option<bool>,
    pub is_active: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl CustomerChanges {
    pub fn is_empty(&self) -> bool {
        self == &CustomerChanges::default()
    }

    /// Apply the writes to an in-memory record, bumping `updated_at`.
    pub fn apply_to(&self, customer: &mut Customer) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }

        set(&mut customer.name, &self.name);
        set(&mut customer.phone, &self.phone);
        set(&mut customer.email, &self.email);
        set(&mut customer.company, &self.company);
        set(&mut customer.address, &self.address);
        set(&mut customer.state, &self.state);
        set(&mut customer.city, &self.city);
        set(&mut customer.pincode, &self.pincode);
        set(&mut customer.gstin, &self.gstin);
        set(&mut customer.notes, &self.notes);
        set(&mut customer.is_inter_state, &self.is_inter_state);
        set(&mut customer.is_active, &self.is_active);
        set(&mut customer.tags, &self.tags);
        customer.updated_at = Utc::now();
    }
}

/// Listing options for an owner's customers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    /// Case-insensitive substring over name, phone, email and company.
    pub search: Option<String>,
    pub limit: i64,
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self {
            search: None,
            limit: 50,
        }
    }
}

/// Customer persistence. Every operation is scoped by the owning user; a record owned
/// by someone else is indistinguishable from one that does not exist.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError>;

    /// Newest first.
    async fn find_many(&self, owner: Uuid, query: &CustomerQuery) -> Result<Vec<Customer>, DatabaseError>;

    async fn insert(&self, customer: &Customer) -> Result<Customer, DatabaseError>;

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &CustomerChanges,
    ) -> Result<Option<Customer>, DatabaseError>;

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError>;

    async fn phone_in_use(
        &self,
        owner: Uuid,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError>;

    async fn email_in_use(
        &self,
        owner: Uuid,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Read access to orders, scoped the same way as customers.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Newest first.
    async fn find_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<Vec<Order>, DatabaseError>;

    async fn count_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<i64, DatabaseError>;
}
