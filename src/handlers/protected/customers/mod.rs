// /api/customers and /api/customers/:id
pub mod collection;
pub mod record;

pub use collection::{get as collection_get, post as collection_post};
pub use record::{delete as record_delete, get as record_get, patch as record_patch, put as record_put};

use uuid::Uuid;

use crate::error::ApiError;

/// Parsed after authorization so 401/403 always win over a malformed id.
pub(crate) fn parse_customer_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::bad_request("Invalid customer ID format"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_uuid_ids() {
        for raw in ["abc", "", "12345", "507f1f77bcf86cd799439011"] {
            let err = parse_customer_id(raw).unwrap_err();
            assert_eq!(err.message(), "Invalid customer ID format");
        }
    }

    #[test]
    fn accepts_canonical_uuid() {
        let id = Uuid::new_v4();
        assert_eq!(parse_customer_id(&id.to_string()).unwrap(), id);
    }
}
