use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Session token claims. No `exp`: a session lasts until the client drops
/// its token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sid: Uuid,
    pub iat: i64,
}

/// Injected by `require_auth` into request extensions.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: Uuid,
    pub issued_at: DateTime<Utc>,
}

pub fn create_session_token(config: &Config) -> AppResult<(String, Session)> {
    let now = Utc::now();
    let claims = Claims {
        sid: Uuid::new_v4(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to create session token: {}", e)))?;

    let session = session_from_claims(&claims)?;
    Ok((token, session))
}

pub fn verify_session_token(token: &str, config: &Config) -> AppResult<Session> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.session_secret.as_bytes()),
        &validation,
    )
    .map_err(|_| AppError::Unauthorized)?;

    session_from_claims(&data.claims)
}

fn session_from_claims(claims: &Claims) -> AppResult<Session> {
    let issued_at = Utc
        .timestamp_opt(claims.iat, 0)
        .single()
        .ok_or(AppError::Unauthorized)?;
    Ok(Session {
        id: claims.sid,
        issued_at,
    })
}
