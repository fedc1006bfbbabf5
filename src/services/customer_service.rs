use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::database::{
    Customer, CustomerChanges, CustomerQuery, CustomerRepository, DatabaseError, Order, OrderRepository,
};
use crate::services::order_stats::OrderStatistics;
use crate::subscription::{ResourceKind, SubscriptionGate};
use crate::validation::{validate_uniqueness, CustomerInput, CustomerPatch, PatchField, UniqueField};

const RECENT_ORDER_COUNT: usize = 5;

/// Failures of customer operations, classified where they are detected. HTTP status
/// mapping happens in `crate::error`.
#[derive(Debug, Error)]
pub enum CustomerError {
    #[error("Customer not found")]
    NotFound,

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("No valid fields to update")]
    NoValidFields,

    #[error("Cannot delete customer with {0} existing order(s)")]
    HasOrders(i64),

    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for CustomerError {
    fn from(err: DatabaseError) -> Self {
        match err {
            // A concurrent write slipped past the uniqueness pre-check
            DatabaseError::UniqueViolation { constraint } => {
                let field = if constraint.contains("email") {
                    UniqueField::Email
                } else {
                    UniqueField::Phone
                };
                CustomerError::Validation(vec![field.duplicate_message().to_string()])
            }
            other => CustomerError::Database(other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub statistics: OrderStatistics,
    pub recent_orders: Vec<Order>,
    pub all_orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct PatchOutcome {
    pub customer: Customer,
    pub fields: Vec<PatchField>,
}

/// Stateless orchestration over the repositories and the billing gate. Cheap to clone.
#[derive(Clone)]
pub struct CustomerService {
    customers: Arc<dyn CustomerRepository>,
    orders: Arc<dyn OrderRepository>,
    billing: Arc<dyn SubscriptionGate>,
}

impl CustomerService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        billing: Arc<dyn SubscriptionGate>,
    ) -> Self {
        Self {
            customers,
            orders,
            billing,
        }
    }

    pub async fn get(&self, owner: Uuid, id: Uuid) -> Result<CustomerDetail, CustomerError> {
        let customer = self.find(owner, id).await?;
        let all_orders = self.orders.find_for_customer(id, owner).await?;
        let statistics = OrderStatistics::compute(&all_orders);
        let recent_orders = all_orders.iter().take(RECENT_ORDER_COUNT).cloned().collect();

        Ok(CustomerDetail {
            customer,
            statistics,
            recent_orders,
            all_orders,
        })
    }

    pub async fn list(&self, owner: Uuid, query: &CustomerQuery) -> Result<Vec<Customer>, CustomerError> {
        Ok(self.customers.find_many(owner, query).await?)
    }

    pub async fn create(&self, owner: Uuid, input: &CustomerInput) -> Result<Customer, CustomerError> {
        let changes = input.validate().map_err(CustomerError::Validation)?;
        self.check_unique(owner, &changes, None).await?;

        let mut customer = Customer::new(owner, String::new(), String::new());
        changes.apply_to(&mut customer);
        let created = self.customers.insert(&customer).await?;

        info!("Created customer {} for user {}", created.id, owner);
        self.adjust_usage(owner, 1);
        Ok(created)
    }

    /// Full update: name and phone required, other recognised fields replace stored values.
    pub async fn update(&self, owner: Uuid, id: Uuid, input: &CustomerInput) -> Result<Customer, CustomerError> {
        let changes = input.validate().map_err(CustomerError::Validation)?;
        self.find(owner, id).await?;
        self.check_unique(owner, &changes, Some(id)).await?;

        let updated = self
            .customers
            .update(id, owner, &changes)
            .await?
            .ok_or(CustomerError::NotFound)?;

        info!("Updated customer {} for user {}", id, owner);
        Ok(updated)
    }

    /// Partial update restricted to the patchable fields.
    pub async fn patch(&self, owner: Uuid, id: Uuid, patch: &CustomerPatch) -> Result<PatchOutcome, CustomerError> {
        if patch.is_empty() {
            return Err(CustomerError::NoValidFields);
        }
        let validated = patch.validate().map_err(CustomerError::Validation)?;
        self.find(owner, id).await?;
        self.check_unique(owner, &validated.changes, Some(id)).await?;

        let customer = self
            .customers
            .update(id, owner, &validated.changes)
            .await?
            .ok_or(CustomerError::NotFound)?;

        info!("Patched customer {} for user {} ({} field(s))", id, owner, validated.fields.len());
        Ok(PatchOutcome {
            customer,
            fields: validated.fields,
        })
    }

    /// Delete unless orders still reference the customer.
    pub async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Customer, CustomerError> {
        self.find(owner, id).await?;

        let order_count = self.orders.count_for_customer(id, owner).await?;
        if order_count > 0 {
            return Err(CustomerError::HasOrders(order_count));
        }

        let deleted = self
            .customers
            .delete(id, owner)
            .await?
            .ok_or(CustomerError::NotFound)?;

        info!("Deleted customer {} for user {}", id, owner);
        self.adjust_usage(owner, -1);
        Ok(deleted)
    }

    async fn find(&self, owner: Uuid, id: Uuid) -> Result<Customer, CustomerError> {
        self.customers
            .find_one(id, owner)
            .await?
            .ok_or(CustomerError::NotFound)
    }

    /// Phone and email must be unique among the owner's other customers.
    async fn check_unique(
        &self,
        owner: Uuid,
        changes: &CustomerChanges,
        exclude: Option<Uuid>,
    ) -> Result<(), CustomerError> {
        let mut errors = Vec::new();

        if let Some(phone) = changes.phone.as_deref() {
            if !validate_uniqueness(self.customers.as_ref(), UniqueField::Phone, phone, owner, exclude).await? {
                errors.push(UniqueField::Phone.duplicate_message().to_string());
            }
        }
        if let Some(Some(email)) = changes.email.as_ref() {
            if !validate_uniqueness(self.customers.as_ref(), UniqueField::Email, email, owner, exclude).await? {
                errors.push(UniqueField::Email.duplicate_message().to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(CustomerError::Validation(errors))
        }
    }

    /// Best-effort usage counter update on a detached task; failures are only logged.
    fn adjust_usage(&self, owner: Uuid, delta: i64) {
        let billing = Arc::clone(&self.billing);
        tokio::spawn(async move {
            if let Err(e) = billing.update_usage(owner, ResourceKind::Customers, delta).await {
                warn!("Failed to adjust customer usage for user {} by {}: {}", owner, delta, e);
            }
        });
    }
}
