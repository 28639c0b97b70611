use std::env;

use crate::database::RedisService;
use crate::utils::error::ApiError;
use actix_web_httpauth::extractors::bearer::BearerAuth;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const SESSION_TTL_SECONDS: u64 = 86400;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub id: String,
    pub role: String,
    pub exp: usize,
}

fn jwt_secret() -> String {
    env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string())
}

fn encode_claims(claims: &Claims, secret: &str) -> Result<String, ApiError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| ApiError::InternalServerError("Token generation failed".to_string()))
}

fn decode_claims(token: &str, secret: &str) -> Result<Claims, ApiError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| ApiError::UnauthorizedError("Invalid token".to_string()))
}

fn build_claims(user_id: &str, role: &str) -> Result<Claims, ApiError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::hours(24))
        .ok_or_else(|| ApiError::InternalServerError("Invalid expiry timestamp".to_string()))?
        .timestamp() as usize;

    Ok(Claims {
        id: user_id.to_owned(),
        role: role.to_owned(),
        exp: expiration,
    })
}

/// Create a JWT and record the session in Redis so logout can revoke it
pub async fn create_token_with_session(
    user_id: &str,
    role: &str,
    redis_service: &RedisService,
) -> Result<String, ApiError> {
    let claims = build_claims(user_id, role)?;
    let token = encode_claims(&claims, &jwt_secret())?;

    redis_service
        .store_session(user_id, &token, SESSION_TTL_SECONDS)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("Failed to store session: {}", e)))?;

    Ok(token)
}

/// Create a JWT without a Redis session (used when Redis is unavailable)
pub fn create_token(user_id: &str, role: &str) -> Result<String, ApiError> {
    let claims = build_claims(user_id, role)?;
    encode_claims(&claims, &jwt_secret())
}

/// Verify the bearer token and, when Redis is available, check that it is
/// still the user's live session. A Redis outage falls back to plain JWT
/// validation rather than locking everyone out.
pub async fn authenticate(
    credentials: &BearerAuth,
    redis_service: Option<&RedisService>,
) -> Result<Claims, ApiError> {
    let token = credentials.token();
    let claims = decode_claims(token, &jwt_secret())?;

    let redis = match redis_service {
        Some(redis) => redis,
        None => return Ok(claims),
    };

    match redis.validate_session(&claims.id, token).await {
        Ok(Some(_)) => Ok(claims),
        Ok(None) => Err(ApiError::UnauthorizedError(
            "Session expired or invalid".to_string(),
        )),
        Err(_) => Ok(claims),
    }
}

/// Drop the user's session (logout)
pub async fn invalidate_session(
    user_id: &str,
    redis_service: &RedisService,
) -> Result<(), ApiError> {
    redis_service
        .invalidate_session(user_id)
        .await
        .map_err(|e| ApiError::InternalServerError(format!("Failed to invalidate session: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::{Claims, decode_claims, encode_claims};

    #[test]
    fn token_round_trips_id_and_role() {
        let claims = Claims {
            id: "652f1a2b3c4d5e6f70818283".to_string(),
            role: "moderator".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };

        let token = encode_claims(&claims, "test-secret").unwrap();
        let decoded = decode_claims(&token, "test-secret").unwrap();

        assert_eq!(decoded.id, claims.id);
        assert_eq!(decoded.role, claims.role);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let claims = Claims {
            id: "652f1a2b3c4d5e6f70818283".to_string(),
            role: "user".to_string(),
            exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        };

        let token = encode_claims(&claims, "test-secret").unwrap();
        assert!(decode_claims(&token, "other-secret").is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let claims = Claims {
            id: "652f1a2b3c4d5e6f70818283".to_string(),
            role: "user".to_string(),
            exp: (chrono::Utc::now().timestamp() - 3600) as usize,
        };

        let token = encode_claims(&claims, "test-secret").unwrap();
        assert!(decode_claims(&token, "test-secret").is_err());
    }
}
