// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::middleware::auth::AuthorizeError;
use crate::services::CustomerError;

/// Message shown for inactive plans; clients surface it verbatim.
pub const SUBSCRIPTION_EXPIRED_MESSAGE: &str =
    "Your subscription has expired or is inactive. Please upgrade your plan to continue.";

/// HTTP API error with appropriate status codes and client-friendly messages.
/// This is the only place where failures become status codes.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        errors: Vec<String>,
    },
    InvalidJson(String),
    /// Delete blocked by dependent records. Reported as 400 with the dependent count.
    Conflict {
        message: String,
        order_count: i64,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidJson(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict { .. } => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(_) => "Invalid JSON body",
            ApiError::Conflict { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
        });

        match self {
            ApiError::ValidationError { errors, .. } if !errors.is_empty() => {
                body["errors"] = json!(errors);
            }
            ApiError::InvalidJson(detail) => {
                body["errors"] = json!([detail]);
            }
            ApiError::Conflict { order_count, .. } => {
                body["orderCount"] = json!(order_count);
            }
            _ => {}
        }

        body
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(message: impl Into<String>, errors: Vec<String>) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            errors,
        }
    }

    pub fn invalid_json(detail: impl Into<String>) -> Self {
        ApiError::InvalidJson(detail.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::ConfigMissing(_) | DatabaseError::InvalidDatabaseUrl => {
                tracing::error!("Database misconfigured: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Log the real error but return generic message
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<CustomerError> for ApiError {
    fn from(err: CustomerError) -> Self {
        match err {
            CustomerError::NotFound => ApiError::not_found("Customer not found"),
            CustomerError::Validation(errors) => {
                let message = match errors.as_slice() {
                    [only] => only.clone(),
                    _ => "Validation failed".to_string(),
                };
                ApiError::validation_error(message, errors)
            }
            CustomerError::NoValidFields => ApiError::bad_request("No valid fields to update"),
            CustomerError::HasOrders(order_count) => ApiError::Conflict {
                message: format!(
                    "Cannot delete customer with {} existing order(s). Delete or reassign the orders first.",
                    order_count
                ),
                order_count,
            },
            CustomerError::Database(e) => e.into(),
        }
    }
}

impl From<AuthorizeError> for ApiError {
    fn from(err: AuthorizeError) -> Self {
        match err {
            AuthorizeError::Unauthenticated(_) => ApiError::unauthorized("Authentication required"),
            AuthorizeError::SubscriptionInactive => ApiError::forbidden(SUBSCRIPTION_EXPIRED_MESSAGE),
            AuthorizeError::SubscriptionUnavailable(e) => {
                tracing::error!("Subscription check failed: {}", e);
                ApiError::service_unavailable("Unable to verify subscription status")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::invalid_json(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation_error("Invalid query parameters", vec![rejection.body_text()])
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthError;

    #[test]
    fn validation_body_lists_errors() {
        let err: ApiError = CustomerError::Validation(vec!["a".into(), "b".into()]).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_json(),
            json!({ "success": false, "message": "Validation failed", "errors": ["a", "b"] })
        );
    }

    #[test]
    fn single_validation_error_becomes_the_message() {
        let err: ApiError =
            CustomerError::Validation(vec!["Another customer already uses this phone number".into()]).into();
        assert_eq!(err.message(), "Another customer already uses this phone number");
    }

    #[test]
    fn dependency_conflict_is_400_with_count() {
        let err: ApiError = CustomerError::HasOrders(3).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_json()["orderCount"], json!(3));
    }

    #[test]
    fn auth_and_subscription_failures_are_distinct() {
        let unauth: ApiError = AuthorizeError::Unauthenticated(AuthError::Expired).into();
        let inactive: ApiError = AuthorizeError::SubscriptionInactive.into();
        assert_eq!(unauth.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(inactive.status_code(), StatusCode::FORBIDDEN);
        assert!(inactive.message().contains("subscription"));
    }

    #[test]
    fn database_errors_are_not_echoed() {
        let err: ApiError = CustomerError::Database(DatabaseError::Sqlx(sqlx::Error::PoolTimedOut)).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!err.message().contains("pool"));
    }
}
