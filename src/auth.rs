use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{config::AppConfig, error::ApiError};

/// Claims
///
/// Represents the payload structure expected inside a JSON Web Token (JWT).
/// These claims are signed by the server's secret and validated upon every
/// authenticated request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): The UUID of the user who owns the token.
    pub sub: Uuid,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// AuthUser Extractor Result
///
/// The resolved identity of an authenticated request. Handlers take this as an
/// argument to receive the requesting user's id; its presence in a handler
/// signature is what makes a route protected.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The unique identifier of the user, decoded from the token's `sub` claim.
    pub id: Uuid,
}

/// AuthUser Extractor Implementation
///
/// Implements Axum's FromRequestParts trait, making AuthUser usable as a function
/// argument in any authenticated handler. This cleanly separates authentication
/// (extractor) from request handling (the handler).
///
/// The process:
/// 1. Bearer token extraction from the Authorization header.
/// 2. Signature and expiry validation against the process-wide secret.
/// 3. Identity attachment: the `sub` claim becomes the request's user id.
///
/// The token's claim is trusted as-is; no store lookup re-confirms that the user
/// still exists. Rejection: `ApiError::Unauthorized` (401) on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    // Allows the extractor to pull the AppConfig (for the JWT secret).
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        // Token Extraction: the Authorization header must carry a "Bearer " prefix.
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

        let mut validation = Validation::default();
        // Ensure expiration time validation is always active.
        validation.validate_exp = true;

        // Expired, malformed, and badly signed tokens are indistinguishable to the
        // client: all reject with 401.
        let token_data = decode::<Claims>(token, &decoding_key, &validation)
            .map_err(|_| ApiError::Unauthorized)?;

        Ok(AuthUser {
            id: token_data.claims.sub,
        })
    }
}

/// issue_token
///
/// Signs a new bearer token for the given user id. Tokens carry a 24 hour
/// expiry; the secret comes from the loaded configuration.
pub fn issue_token(user_id: Uuid, secret: &str) -> Result<String, ApiError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::hours(24)).timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::Internal)
}

/// hash_password
///
/// Hashes a clear-text password with Argon2id, producing the PHC string stored
/// in the users table.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| ApiError::Internal)
}

/// verify_password
///
/// Checks a clear-text password against a stored Argon2 hash. An unparsable
/// stored hash counts as a failed verification rather than an internal error,
/// so corrupt rows cannot be used to sign in.
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
