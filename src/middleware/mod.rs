pub mod auth;
pub mod response;

pub use auth::{authorize, require_active_subscription, AuthContext, AuthorizeError};
pub use response::{ApiResponse, ApiResult};
