use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wrapper for API responses that adds the `success: true` discriminator.
/// Object payloads are flattened into the envelope; anything else goes under `data`.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub status_code: Option<StatusCode>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn success(data: T) -> Self {
        Self {
            data,
            status_code: None, // Default to 200 OK
        }
    }

    /// Create an API response with custom status code
    pub fn with_status(data: T, status_code: StatusCode) -> Self {
        Self {
            data,
            status_code: Some(status_code),
        }
    }

    /// Create a 201 Created response
    pub fn created(data: T) -> Self {
        Self::with_status(data, StatusCode::CREATED)
    }
}

fn envelope(data: Value) -> Value {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    match data {
        Value::Object(fields) => {
            for (key, value) in fields {
                if key != "success" {
                    body.insert(key, value);
                }
            }
        }
        Value::Null => {}
        other => {
            body.insert("data".into(), other);
        }
    }
    Value::Object(body)
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data"
                    })),
                )
                    .into_response();
            }
        };

        (status, Json(envelope(data_value))).into_response()
    }
}

// Convenience type alias
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_object_payloads() {
        let body = envelope(json!({ "message": "ok", "customer": { "id": "1" } }));
        assert_eq!(body, json!({ "success": true, "message": "ok", "customer": { "id": "1" } }));
    }

    #[test]
    fn payload_cannot_override_success_flag() {
        let body = envelope(json!({ "success": false, "count": 2 }));
        assert_eq!(body, json!({ "success": true, "count": 2 }));
    }

    #[test]
    fn wraps_non_objects() {
        assert_eq!(envelope(json!([1, 2])), json!({ "success": true, "data": [1, 2] }));
    }
}
