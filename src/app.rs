use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use sqlx::PgPool;

use crate::auth::TokenVerifier;
use crate::database::{CustomerRepository, OrderRepository, PgCustomerRepository, PgOrderRepository};
use crate::handlers;
use crate::middleware::require_active_subscription;
use crate::services::CustomerService;
use crate::subscription::{PgSubscriptionService, SubscriptionGate};

/// Shared per-process state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub customers: CustomerService,
    /// Kept separately so `/health` can ping the datastore without a service call.
    pub repository: Arc<dyn CustomerRepository>,
    pub subscriptions: Arc<dyn SubscriptionGate>,
    pub verifier: TokenVerifier,
    pub auth_cookie: String,
}

impl AppState {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        orders: Arc<dyn OrderRepository>,
        subscriptions: Arc<dyn SubscriptionGate>,
        verifier: TokenVerifier,
        auth_cookie: impl Into<String>,
    ) -> Self {
        Self {
            customers: CustomerService::new(Arc::clone(&customers), orders, Arc::clone(&subscriptions)),
            repository: customers,
            subscriptions,
            verifier,
            auth_cookie: auth_cookie.into(),
        }
    }

    /// Postgres-backed state for the server binary.
    pub fn from_pool(pool: PgPool, verifier: TokenVerifier, auth_cookie: impl Into<String>) -> Self {
        Self::new(
            Arc::new(PgCustomerRepository::new(pool.clone())),
            Arc::new(PgOrderRepository::new(pool.clone())),
            Arc::new(PgSubscriptionService::new(pool)),
            verifier,
            auth_cookie,
        )
    }
}

/// Full route table. Transport layers (CORS, tracing, body limit) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(handlers::public::root))
        .route("/health", get(handlers::public::health))
        // Protected
        .merge(customer_routes(state.clone()))
        .with_state(state)
}

fn customer_routes(state: AppState) -> Router<AppState> {
    use handlers::protected::customers;

    Router::new()
        // Collection
        .route(
            "/api/customers",
            get(customers::collection_get).post(customers::collection_post),
        )
        // Record
        .route(
            "/api/customers/:id",
            get(customers::record_get)
                .put(customers::record_put)
                .patch(customers::record_patch)
                .delete(customers::record_delete),
        )
        .route_layer(middleware::from_fn_with_state(state, require_active_subscription))
}
