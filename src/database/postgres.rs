use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{Customer, Order};
use crate::database::repository::{CustomerChanges, CustomerQuery, CustomerRepository, OrderRepository};

const CUSTOMER_COLUMNS: &str = "id, user_id, name, phone, email, company, address, state, city, pincode, \
     gstin, is_inter_state, is_active, total_orders, total_spent, last_order_date, notes, tags, \
     created_at, updated_at";

const ORDER_COLUMNS: &str = "id, user_id, customer_id, order_number, status, payment_status, \
     subtotal, cgst, sgst, igst, total, amount_paid, created_at";

#[derive(Clone)]
pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn push_set<'args, T>(qb: &mut QueryBuilder<'args, Postgres>, column: &str, value: T)
where
    T: 'args + sqlx::Encode<'args, Postgres> + sqlx::Type<Postgres> + Send,
{
    qb.push(", ").push(column).push(" = ").push_bind(value);
}

/// `%term%` with LIKE metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn find_one(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let sql = format!("SELECT {} FROM customers WHERE id = $1 AND user_id = $2", CUSTOMER_COLUMNS);
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_many(&self, owner: Uuid, query: &CustomerQuery) -> Result<Vec<Customer>, DatabaseError> {
        let pattern = query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(like_pattern);

        let sql = format!(
            "SELECT {} FROM customers \
             WHERE user_id = $1 \
               AND ($2::TEXT IS NULL OR name ILIKE $2 OR phone ILIKE $2 OR email ILIKE $2 OR company ILIKE $2) \
             ORDER BY created_at DESC \
             LIMIT $3",
            CUSTOMER_COLUMNS
        );

        let rows = sqlx::query_as::<_, Customer>(&sql)
            .bind(owner)
            .bind(pattern)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, customer: &Customer) -> Result<Customer, DatabaseError> {
        let sql = format!(
            "INSERT INTO customers ({cols}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20) \
             RETURNING {cols}",
            cols = CUSTOMER_COLUMNS
        );

        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(customer.id)
            .bind(customer.user_id)
            .bind(&customer.name)
            .bind(&customer.phone)
            .bind(&customer.email)
            .bind(&customer.company)
            .bind(&customer.address)
            .bind(&customer.state)
            .bind(&customer.city)
            .bind(&customer.pincode)
            .bind(&customer.gstin)
            .bind(customer.is_inter_state)
            .bind(customer.is_active)
            .bind(customer.total_orders)
            .bind(customer.total_spent)
            .bind(customer.last_order_date)
            .bind(&customer.notes)
            .bind(&customer.tags)
            .bind(customer.created_at)
            .bind(customer.updated_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: &CustomerChanges,
    ) -> Result<Option<Customer>, DatabaseError> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE customers SET updated_at = now()");

        if let Some(v) = &changes.name {
            push_set(&mut qb, "name", v.clone());
        }
        if let Some(v) = &changes.phone {
            push_set(&mut qb, "phone", v.clone());
        }
        if let Some(v) = &changes.email {
            push_set(&mut qb, "email", v.clone());
        }
        if let Some(v) = &changes.company {
            push_set(&mut qb, "company", v.clone());
        }
        if let Some(v) = &changes.address {
            push_set(&mut qb, "address", v.clone());
        }
        if let Some(v) = &changes.state {
            push_set(&mut qb, "state", v.clone());
        }
        if let Some(v) = &changes.city {
            push_set(&mut qb, "city", v.clone());
        }
        if let Some(v) = &changes.pincode {
            push_set(&mut qb, "pincode", v.clone());
        }
        if let Some(v) = &changes.gstin {
            push_set(&mut qb, "gstin", v.clone());
        }
        if let Some(v) = &changes.notes {
            push_set(&mut qb, "notes", v.clone());
        }
        if let Some(v) = changes.is_inter_state {
            push_set(&mut qb, "is_inter_state", v);
        }
        if let Some(v) = changes.is_active {
            push_set(&mut qb, "is_active", v);
        }
        if let Some(v) = &changes.tags {
            push_set(&mut qb, "tags", v.clone());
        }

        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" AND user_id = ")
            .push_bind(owner)
            .push(" RETURNING ")
            .push(CUSTOMER_COLUMNS);

        debug!("Updating customer {} for owner {}", id, owner);
        let row = qb
            .build_query_as::<Customer>()
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: Uuid, owner: Uuid) -> Result<Option<Customer>, DatabaseError> {
        let sql = format!(
            "DELETE FROM customers WHERE id = $1 AND user_id = $2 RETURNING {}",
            CUSTOMER_COLUMNS
        );
        let row = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .bind(owner)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn phone_in_use(
        &self,
        owner: Uuid,
        phone: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE user_id = $1 AND phone = $2 AND ($3::UUID IS NULL OR id <> $3))",
        )
        .bind(owner)
        .bind(phone)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn email_in_use(
        &self,
        owner: Uuid,
        email: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, DatabaseError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM customers WHERE user_id = $1 AND email = $2 AND ($3::UUID IS NULL OR id <> $3))",
        )
        .bind(owner)
        .bind(email)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        DatabaseManager::health_check(&self.pool).await
    }
}

#[derive(Clone)]
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn find_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<Vec<Order>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM orders WHERE customer_id = $1 AND user_id = $2 ORDER BY created_at DESC",
            ORDER_COLUMNS
        );
        let rows = sqlx::query_as::<_, Order>(&sql)
            .bind(customer_id)
            .bind(owner)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn count_for_customer(&self, customer_id: Uuid, owner: Uuid) -> Result<i64, DatabaseError> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM orders WHERE customer_id = $1 AND user_id = $2")
                .bind(customer_id)
                .bind(owner)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}
