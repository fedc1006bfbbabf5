use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use rust_decimal::prelude::ToPrimitive;
use serde_json::{json, Value};

use crate::api::{to_external_shape, DeletedCustomerDto};
use crate::app::AppState;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::validation::{CustomerInput, CustomerPatch};

use super::parse_customer_id;

/// GET /api/customers/:id - Customer with order statistics
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_customer_id(&id)?;
    let detail = state.customers.get(auth.user_id, id).await?;

    Ok(ApiResponse::success(json!({
        "customer": to_external_shape(&detail.customer),
        "statistics": detail.statistics,
        "recentOrders": detail.recent_orders,
        "allOrders": detail.all_orders,
    })))
}

/// PUT /api/customers/:id - Full update
pub async fn put(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> ApiResult<Value> {
    let id = parse_customer_id(&id)?;
    let Json(input) = body?;
    let customer = state.customers.update(auth.user_id, id, &input).await?;

    Ok(ApiResponse::success(json!({
        "message": "Customer updated successfully",
        "customer": to_external_shape(&customer),
    })))
}

/// PATCH /api/customers/:id - Partial update of notes, tags, isActive, address, email
pub async fn patch(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
    body: Result<Json<CustomerPatch>, JsonRejection>,
) -> ApiResult<Value> {
    let id = parse_customer_id(&id)?;
    let Json(patch) = body?;
    let outcome = state.customers.patch(auth.user_id, id, &patch).await?;

    Ok(ApiResponse::success(json!({
        "message": "Customer updated successfully",
        "customer": to_external_shape(&outcome.customer),
        "updatedFields": outcome.fields,
    })))
}

/// DELETE /api/customers/:id - Refused while orders reference the customer
pub async fn delete(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<String>,
) -> ApiResult<Value> {
    let id = parse_customer_id(&id)?;
    let deleted = state.customers.delete(auth.user_id, id).await?;

    Ok(ApiResponse::success(json!({
        "message": "Customer deleted successfully",
        "deletedCustomer": DeletedCustomerDto::from(&deleted),
        "statistics": {
            "totalOrders": deleted.total_orders,
            "totalSpent": deleted.total_spent.to_f64().unwrap_or_default(),
        },
    })))
}
