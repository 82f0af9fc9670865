//! Bearer token generation and validation

use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::User;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub is_staff: bool,
    /// Expiration timestamp
    pub exp: u64,
    /// Issued at
    pub iat: u64,
}

/// Generate an HS256 token for `user` valid for `lifetime_seconds`.
pub fn generate_token(
    user: &User,
    secret: &str,
    lifetime_seconds: u64,
) -> cookbook_shared::Result<String> {
    let now = u64::try_from(OffsetDateTime::now_utc().unix_timestamp()).unwrap_or_default();

    let claims = Claims {
        sub: user.id.to_owned(),
        is_staff: user.is_staff,
        exp: now.saturating_add(lifetime_seconds),
        iat: now,
    };

    Ok(encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?)
}

/// Validate signature and expiry, returning the decoded claims.
pub fn validate_token(token: &str, secret: &str) -> cookbook_shared::Result<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}
