use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::api::{to_external_shape, CustomerDto};
use crate::app::AppState;
use crate::database::CustomerQuery;
use crate::middleware::{ApiResponse, ApiResult, AuthContext};
use crate::validation::CustomerInput;

const MAX_LIST_LIMIT: i64 = 200;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Case-insensitive match over name, phone, email and company.
    pub search: Option<String>,
    pub limit: Option<i64>,
}

impl ListQuery {
    fn into_query(self) -> CustomerQuery {
        let defaults = CustomerQuery::default();
        CustomerQuery {
            search: self
                .search
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            limit: self.limit.unwrap_or(defaults.limit).clamp(1, MAX_LIST_LIMIT),
        }
    }
}

/// GET /api/customers - The caller's customers, newest first
pub async fn get(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Value> {
    let Query(query) = query?;
    let customers = state.customers.list(auth.user_id, &query.into_query()).await?;
    let customers: Vec<CustomerDto> = customers.iter().map(to_external_shape).collect();

    Ok(ApiResponse::success(json!({
        "count": customers.len(),
        "customers": customers,
    })))
}

/// POST /api/customers - Create a customer
pub async fn post(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    body: Result<Json<CustomerInput>, JsonRejection>,
) -> ApiResult<Value> {
    let Json(input) = body?;
    let customer = state.customers.create(auth.user_id, &input).await?;

    Ok(ApiResponse::created(json!({
        "message": "Customer created successfully",
        "customer": to_external_shape(&customer),
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_limit_is_clamped() {
        let query = ListQuery { search: None, limit: Some(10_000) }.into_query();
        assert_eq!(query.limit, MAX_LIST_LIMIT);

        let query = ListQuery { search: None, limit: Some(0) }.into_query();
        assert_eq!(query.limit, 1);

        assert_eq!(ListQuery::default().into_query().limit, 50);
    }

    #[test]
    fn blank_search_is_ignored() {
        let query = ListQuery { search: Some("   ".into()), limit: None }.into_query();
        assert_eq!(query.search, None);
    }
}
