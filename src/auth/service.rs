use crate::config::AuthConfig;
use crate::db::models::User;
use crate::error::{AppError, AuthError};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, decode, Header, EncodingKey, DecodingKey, Validation, Algorithm};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Claims {
    pub sub: String,  // User ID
    pub username: String,
    pub exp: i64,     // Expiration time
    pub iat: i64,     // Issued at
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::from(AuthError::InvalidToken))
    }
}

/// Signs and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenService {
    pub fn new(secret: &str, expiry_hours: i64) -> Result<Self, AppError> {
        let expiry = Duration::try_hours(expiry_hours)
            .filter(|expiry| *expiry > Duration::zero())
            .ok_or_else(|| {
                AppError::ConfigError(format!("invalid token expiry of {} hours", expiry_hours))
            })?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry,
        })
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, AppError> {
        Self::new(&config.token_secret, config.token_expiry_hours)
    }

    pub fn sign(&self, user: &User) -> Result<String, AppError> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.expiry)
            .ok_or_else(|| AppError::InternalError("token expiry overflows".into()))?;
        let claims = Claims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };
        self.encode(&claims)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        let data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(data.claims)
    }

    fn encode(&self, claims: &Claims) -> Result<String, AppError> {
        Ok(encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new("ada".into(), "Ada".into(), "Lovelace".into(), "digest".into())
    }

    #[test]
    fn test_sign_and_verify() {
        let tokens = TokenService::new("test_secret", 1).unwrap();
        let user = user();
        let token = tokens.sign(&user).unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user.id);
        assert_eq!(claims.username, "ada");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = TokenService::new("one", 1).unwrap().sign(&user()).unwrap();
        let result = TokenService::new("two", 1).unwrap().verify(&token);
        assert!(matches!(result, Err(AppError::AuthError(AuthError::InvalidToken))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new("test_secret", 1).unwrap();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "ada".into(),
            exp: now - 3600,
            iat: now - 7200,
        };
        let token = tokens.encode(&claims).unwrap();

        let result = tokens.verify(&token);
        assert!(matches!(result, Err(AppError::AuthError(AuthError::TokenExpired))));
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = TokenService::new("test_secret", 1).unwrap();
        assert!(matches!(
            tokens.verify("invalid_token"),
            Err(AppError::AuthError(AuthError::InvalidToken))
        ));
    }

    #[test]
    fn test_expiry_bounds() {
        assert!(TokenService::new("test_secret", i64::MAX).is_err());
        assert!(TokenService::new("test_secret", 0).is_err());
        assert!(TokenService::new("test_secret", -1).is_err());
        assert!(TokenService::new("test_secret", 24 * 365).is_ok());
    }
}
