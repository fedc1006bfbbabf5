//! In-memory stand-ins for the datastore and the billing store.
//!
//! Both count every call so tests can assert that a rejected request never
//! reached storage.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::database::{
    Customer, CustomerChanges, CustomerQuery, CustomerRepository, DatabaseError, Order, OrderRepository,
};
use crate::subscription::{ResourceKind, SubscriptionError, SubscriptionGate, SubscriptionState};

#[derive(Default)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
    orders: RwLock<Vec<Order>>,
    calls: AtomicUsize,
    offline: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of repository calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every subsequent call fail as if the datastore were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Insert a customer directly, bypassing validation and the call counter.
    pub async fn seed_customer(&self, owner: Uuid, name: &str, phone: &str) -> Customer {
        let customer = Customer::new(owner, name.to_string(), phone.to_string());
        self.customers.write().await.push(customer.clone());
        customer
    }

    /// Attach an order to a customer and bump its accumulators the way the ordering side would.
    pub async fn seed_order(&self, customer: &Customer, total: Decimal, status: &str, payment_status: &str) -> Order {
        let orders_so_far = self.orders.read().await.len() as i64;
        let created_at = Utc::now() + Duration::seconds(orders_so_far);
        let order = Order {
            id: Uuid::new_v4(),
            user_id: customer.user_id,
            customer_id: customer.id,
            order_number: format!("ORD-{:04}", orders_so_far + 1),
            status: status.to_string(),
            payment_status: payment_status.to_string(),
            subtotal: total,
            cgst: Decimal::ZERO,
            sgst: Decimal::ZERO,
            igst: Decimal::ZERO,
            total,
            amount_paid: Decimal::ZERO,
            created_at,
        };
        self.orders.write().await.push(order.clone());

        let mut customers = self.customers.write().await;
        if let Some(stored) = customers.iter_mut().find(|c| c.id == customer.id) {
            stored.total_orders += 1;
            stored.total_spent += total;
            stored.last_order_date = Some(created_at);
        }
        order
    }

    fn touch(&self) -> Result<(), DatabaseError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn matches_search(customer: &Customer, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    [
        Some(customer.name.as_str()),
        Some(customer.phone.as_str()),
        customer.email.as_deref(),
        customer.company.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&needle))
}

#[async_trait]
impl CustomerRepository for MemoryStore {
    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError> {
        self.touch()?;
        let customers = self.customers.read().await;
        Ok(customers.iter().find(|c| c.id == id && c.user_id == owner).cloned())
    }

    async fn find_many(&self, owner: Uuid, query: &CustomerQuery) -> Result<Vec<Customer>, DatabaseError> {
        self.touch()?;
        let customers = self.customers.read().await;
        let mut found: Vec<Customer> = customers
            .iter()
            .filter(|c| c.user_id == owner)
            .filter(|c| query.search.as_deref().map_or(true, |s| matches_search(c, s)))
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        found.truncate(query.limit.max(0) as usize);
        Ok(found)
    }

    async fn insert(&self, customer: &Customer) -> Result<Customer, DatabaseError> {
        self.touch()?;
        self.customers.write().await.push(customer.clone());
        Ok(customer.clone())
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &CustomerChanges,
    ) -> Result<Option<Customer>, DatabaseError> {
        self.touch()?;
        let mut customers = self.customers.write().await;
        Ok(customers
            .iter_mut()
            .find(|c| c.id == id && c.user_id == owner)
            .map(|customer| {
                changes.apply_to(customer);
                customer.clone()
            }))
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError> {
        self.touch()?;
        let mut customers = self.customers.write().await;
        let position = customers.iter().position(|c| c.id == id && c.user_id == owner);
        Ok(position.map(|index| customers.remove(index)))
    }

    async fn phone_in_use(&self, owner: Uuid, phone: &str, exclude: Option<Uuid>) -> Result<bool, DatabaseError> {
        self.touch()?;
        let customers = self.customers.read().await;
        Ok(customers
            .iter()
            .any(|c| c.user_id == owner && c.phone == phone && Some(c.id) != exclude))
    }

    async fn email_in_use(&self, owner: Uuid, email: &str, exclude: Option<Uuid>) -> Result<bool, DatabaseError> {
        self.touch()?;
        let customers = self.customers.read().await;
        Ok(customers
            .iter()
            .any(|c| c.user_id == owner && c.email.as_deref() == Some(email) && Some(c.id) != exclude))
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        self.touch()
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn find_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<Vec<Order>, DatabaseError> {
        self.touch()?;
        let orders = self.orders.read().await;
        let mut found: Vec<Order> = orders
            .iter()
            .filter(|o| o.customer_id == customer_id && o.user_id == owner)
            .cloned()
            .collect();
        found.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(found)
    }

    async fn count_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<i64, DatabaseError> {
        self.touch()?;
        let orders = self.orders.read().await;
        Ok(orders
            .iter()
            .filter(|o| o.customer_id == customer_id && o.user_id == owner)
            .count() as i64)
    }
}

/// Billing store with per-user plan state. Users without an entry have no subscription.
#[derive(Default)]
pub struct MemorySubscriptions {
    states: RwLock<HashMap<Uuid, SubscriptionState>>,
    usage: RwLock<HashMap<(Uuid, ResourceKind), i64>>,
    checks: AtomicUsize,
    usage_updates: AtomicUsize,
    unavailable: AtomicBool,
    usage_failing: AtomicBool,
}

impl MemorySubscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn activate(&self, user_id: Uuid) {
        self.set_state(user_id, SubscriptionState::from_row("pro".into(), "active".into(), None, Utc::now()))
            .await;
    }

    pub async fn set_state(&self, user_id: Uuid, state: SubscriptionState) {
        self.states.write().await.insert(user_id, state);
    }

    /// Every plan lookup fails.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Plan lookups still work but usage updates fail.
    pub fn set_usage_failing(&self, failing: bool) {
        self.usage_failing.store(failing, Ordering::SeqCst);
    }

    pub fn checks(&self) -> usize {
        self.checks.load(Ordering::SeqCst)
    }

    pub fn usage_updates(&self) -> usize {
        self.usage_updates.load(Ordering::SeqCst)
    }

    pub async fn usage(&self, user_id: Uuid, resource: ResourceKind) -> i64 {
        self.usage.read().await.get(&(user_id, resource)).copied().unwrap_or(0)
    }

    pub async fn set_usage(&self, user_id: Uuid, resource: ResourceKind, count: i64) {
        self.usage.write().await.insert((user_id, resource), count);
    }
}

#[async_trait]
impl SubscriptionGate for MemorySubscriptions {
    async fn check_subscription(&self, user_id: Uuid) -> Result<SubscriptionState, SubscriptionError> {
        self.checks.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(SubscriptionError::Unavailable("billing store offline".into()));
        }
        Ok(self
            .states
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_else(SubscriptionState::none))
    }

    async fn update_usage(&self, user_id: Uuid, resource: ResourceKind, delta: i64) -> Result<(), SubscriptionError> {
        self.usage_updates.fetch_add(1, Ordering::SeqCst);
        if self.usage_failing.load(Ordering::SeqCst) {
            return Err(SubscriptionError::Unavailable("usage counters offline".into()));
        }
        let mut usage = self.usage.write().await;
        let count = usage.entry((user_id, resource)).or_insert(0);
        *count = (*count + delta).max(0);
        Ok(())
    }
}
