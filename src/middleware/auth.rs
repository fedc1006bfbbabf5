use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use thiserror::Error;
use uuid::Uuid;

use crate::app::AppState;
use crate::auth::AuthError;
use crate::error::ApiError;
use crate::subscription::{SubscriptionError, SubscriptionState};

/// Per-request authorization context. The only source of the owner id used to scope
/// datastore calls; client-supplied user ids are never trusted.
#[derive(Clone, Debug)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub user_email: String,
    pub subscription: SubscriptionState,
}

#[derive(Debug, Error)]
pub enum AuthorizeError {
    #[error("authentication required: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("subscription inactive")]
    SubscriptionInactive,

    #[error(transparent)]
    SubscriptionUnavailable(#[from] SubscriptionError),
}

/// Credential from `Authorization: Bearer` first, then the auth cookie.
pub fn extract_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().split_once(' '))
        .filter(|(scheme, _)| scheme.eq_ignore_ascii_case("bearer"))
        .map(|(_, token)| token.trim())
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty())
}

/// Verify the credential, then check the plan. Authentication failures are reported
/// before any subscription lookup happens.
pub async fn authorize(state: &AppState, headers: &HeaderMap) -> Result<AuthContext, AuthorizeError> {
    let token = extract_token(headers, &state.auth_cookie).ok_or(AuthError::MissingToken)?;

    let identity = state.verifier.verify(&token).map_err(|e| {
        tracing::warn!("Rejected credential: {}", e);
        e
    })?;

    let subscription = state.subscriptions.check_subscription(identity.user_id).await?;
    if !subscription.is_active {
        tracing::warn!(
            "Rejected request from user {}: subscription status '{}'",
            identity.user_id,
            subscription.status
        );
        return Err(AuthorizeError::SubscriptionInactive);
    }

    tracing::debug!("Authorized user {} on plan '{}'", identity.user_id, subscription.plan);

    Ok(AuthContext {
        user_id: identity.user_id,
        user_email: identity.email,
        subscription,
    })
}

/// Middleware for every customer route: injects [`AuthContext`] or rejects with 401/403/503.
pub async fn require_active_subscription(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let context = authorize(&state, request.headers()).await?;
    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header::COOKIE, HeaderValue};

    fn headers(pairs: &[(axum::http::HeaderName, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.append(name.clone(), HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Bearer header-token"),
            (COOKIE, "auth_token=cookie-token"),
        ]);
        assert_eq!(extract_token(&map, "auth_token").as_deref(), Some("header-token"));
    }

    #[test]
    fn scheme_is_case_insensitive() {
        for header in ["bearer header-token", "BEARER header-token", "Bearer  header-token "] {
            let map = headers(&[(AUTHORIZATION, header), (COOKIE, "auth_token=cookie-token")]);
            assert_eq!(extract_token(&map, "auth_token").as_deref(), Some("header-token"), "{header}");
        }
    }

    #[test]
    fn falls_back_to_cookie() {
        let map = headers(&[(COOKIE, "theme=dark; auth_token=cookie-token")]);
        assert_eq!(extract_token(&map, "auth_token").as_deref(), Some("cookie-token"));
    }

    #[test]
    fn non_bearer_header_falls_back_to_cookie() {
        let map = headers(&[
            (AUTHORIZATION, "Basic dXNlcjpwYXNz"),
            (COOKIE, "auth_token=cookie-token"),
        ]);
        assert_eq!(extract_token(&map, "auth_token").as_deref(), Some("cookie-token"));
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(extract_token(&HeaderMap::new(), "auth_token"), None);
        let map = headers(&[(AUTHORIZATION, "Bearer   "), (COOKIE, "other=1")]);
        assert_eq!(extract_token(&map, "auth_token"), None);
    }
}
