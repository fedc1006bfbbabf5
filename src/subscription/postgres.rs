use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{ResourceKind, SubscriptionError, SubscriptionGate, SubscriptionState};

/// Reads the `subscriptions` table and maintains `usage_counters`.
#[derive(Clone)]
pub struct PgSubscriptionService {
    pool: PgPool,
}

impl PgSubscriptionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionGate for PgSubscriptionService {
    async fn check_subscription(&self, user_id: Uuid) -> Result<SubscriptionState, SubscriptionError> {
        let row: Option<(String, String, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT plan, status, current_period_end FROM subscriptions WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(match row {
            Some((plan, status, period_end)) => {
                SubscriptionState::from_row(plan, status, period_end, Utc::now())
            }
            None => SubscriptionState::none(),
        })
    }

    async fn update_usage(
        &self,
        user_id: Uuid,
        resource: ResourceKind,
        delta: i64,
    ) -> Result<(), SubscriptionError> {
        sqlx::query(
            r#"
            INSERT INTO usage_counters (user_id, resource_type, count, updated_at)
            VALUES ($1, $2, GREATEST($3::BIGINT, 0), now())
            ON CONFLICT (user_id, resource_type)
            DO UPDATE SET count = GREATEST(usage_counters.count + $3::BIGINT, 0), updated_at = now()
            "#,
        )
        .bind(user_id)
        .bind(resource.as_str())
        .bind(delta)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
