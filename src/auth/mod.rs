use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Signed payload carried by access tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: impl Into<String>, expiry: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            email: email.into(),
            exp: (now + expiry).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Identity proven by a verified token. Lives for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaim {
    pub user_id: Uuid,
    pub email: String,
}

/// Why a credential was rejected. Every variant maps to 401.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingToken,

    #[error("malformed credential")]
    Malformed,

    #[error("credential expired")]
    Expired,

    #[error("credential signature is invalid")]
    InvalidSignature,
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token lifetime of {0} hours is out of range")]
    InvalidExpiry(u64),
}

/// HMAC token verifier. Holds no per-request state and is shared by every handler.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5;

        Ok(Self {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    pub fn verify(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            }
        })?;

        Ok(IdentityClaim {
            user_id: data.claims.user_id,
            email: data.claims.email,
        })
    }
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

/// Mints access tokens. Used by the operator CLI and tests; the API itself never issues tokens.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    expiry: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        let expiry = i64::try_from(expiry_hours)
            .ok()
            .and_then(Duration::try_hours)
            .filter(|expiry| Utc::now().checked_add_signed(*expiry).is_some())
            .ok_or(JwtError::InvalidExpiry(expiry_hours))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            expiry,
        })
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, JwtError> {
        self.sign(&Claims::new(user_id, email, self.expiry))
    }

    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret";

    #[test]
    fn verifies_issued_token() {
        let issuer = TokenIssuer::new(SECRET, 1).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();
        let user_id = Uuid::new_v4();

        let token = issuer.issue(user_id, "owner@example.com").unwrap();
        let identity = verifier.verify(&token).unwrap();

        assert_eq!(identity.user_id, user_id);
        assert_eq!(identity.email, "owner@example.com");
    }

    #[test]
    fn rejects_expired_token() {
        let issuer = TokenIssuer::new(SECRET, 1).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();

        let claims = Claims::new(Uuid::new_v4(), "late@example.com", Duration::hours(-2));
        let token = issuer.sign(&claims).unwrap();

        assert_eq!(verifier.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn rejects_foreign_signature() {
        let issuer = TokenIssuer::new("some-other-secret", 1).unwrap();
        let verifier = TokenVerifier::new(SECRET).unwrap();

        let token = issuer.issue(Uuid::new_v4(), "x@example.com").unwrap();
        assert_eq!(verifier.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn rejects_garbage_and_blank() {
        let verifier = TokenVerifier::new(SECRET).unwrap();
        assert_eq!(verifier.verify("not-a-jwt"), Err(AuthError::Malformed));
        assert_eq!(verifier.verify("   "), Err(AuthError::MissingToken));
    }

    #[test]
    fn empty_secret_is_refused() {
        assert!(matches!(TokenVerifier::new(""), Err(JwtError::InvalidSecret)));
        assert!(matches!(TokenIssuer::new("", 1), Err(JwtError::InvalidSecret)));
    }

    #[test]
    fn oversized_lifetime_is_an_error() {
        assert!(matches!(TokenIssuer::new(SECRET, u64::MAX), Err(JwtError::InvalidExpiry(_))));
        assert!(matches!(
            TokenIssuer::new(SECRET, i64::MAX as u64),
            Err(JwtError::InvalidExpiry(_))
        ));
        assert!(TokenIssuer::new(SECRET, 24 * 365).is_ok());
    }
}
