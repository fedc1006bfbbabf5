//! Subscription gate: billing state lookups and per-user usage counters.
//!
//! The billing store is owned by another subsystem. This crate only reads plan state
//! and nudges usage counters, so both operations sit behind [`SubscriptionGate`].

mod postgres;

pub use postgres::PgSubscriptionService;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Plan state for one account, as seen at request time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub is_active: bool,
    pub plan: String,
    pub status: String,
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionState {
    /// State reported for accounts with no subscription row.
    pub fn none() -> Self {
        Self {
            is_active: false,
            plan: "none".to_string(),
            status: "none".to_string(),
            current_period_end: None,
        }
    }

    pub fn from_row(
        plan: String,
        status: String,
        current_period_end: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Self {
        let is_active = status_grants_access(&status) && current_period_end.map_or(true, |end| end > now);
        Self {
            is_active,
            plan,
            status,
            current_period_end,
        }
    }
}

fn status_grants_access(status: &str) -> bool {
    matches!(status, "active" | "trialing")
}

/// Resource families whose counts are metered by billing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Customers,
    Materials,
    Orders,
    TeamMembers,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Customers => "customers",
            ResourceKind::Materials => "materials",
            ResourceKind::Orders => "orders",
            ResourceKind::TeamMembers => "team_members",
        }
    }
}

#[derive(Debug, Error)]
pub enum SubscriptionError {
    #[error("subscription store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for SubscriptionError {
    fn from(err: sqlx::Error) -> Self {
        SubscriptionError::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait SubscriptionGate: Send + Sync {
    /// Look up the caller's plan. Store failures are errors, never an implicit "active".
    async fn check_subscription(&self, user_id: Uuid) -> Result<SubscriptionState, SubscriptionError>;

    /// Adjust a usage counter by `delta`. Counters never go below zero.
    async fn update_usage(
        &self,
        user_id: Uuid,
        resource: ResourceKind,
        delta: i64,
    ) -> Result<(), SubscriptionError>;
}
