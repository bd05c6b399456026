//! JWT issuance and validation
//!
//! Access tokens are signed with HS256 using a server-held secret and carry
//! the user's identity and an expiration 30 minutes after issuance.

use anyhow::Result;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Shared secret for signing and verifying tokens
    pub secret: String,
    /// Access token expiration time in seconds (default: 30 minutes)
    pub token_expiry: u64,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    ///
    /// # Environment Variables
    /// - `JWT_SECRET`: Shared signing secret. Required; a missing or empty
    ///   secret is a fatal startup condition.
    /// - `TOKEN_EXPIRY`: Access token expiry in seconds (default: 1800)
    pub fn from_env() -> Result<Self> {
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable not set"))?;

        if secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must not be empty");
        }

        let token_expiry = std::env::var("TOKEN_EXPIRY")
            .unwrap_or_else(|_| "1800".to_string())
            .parse()
            .unwrap_or(1800);

        Ok(JwtConfig {
            secret,
            token_expiry,
        })
    }
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: i64,
    /// Token identifier; makes back-to-back tokens for the same user distinct
    pub jti: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// JWT service
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_expiry: u64,
}

impl JwtService {
    /// Initialize a new JWT service
    pub fn new(config: &JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;

        JwtService {
            encoding_key,
            decoding_key,
            validation,
            token_expiry: config.token_expiry,
        }
    }

    /// Generate an access token for a user
    pub fn generate_token(&self, user_id: i64) -> Result<String> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| anyhow::anyhow!("Failed to get current time: {}", e))?
            .as_secs();

        let claims = Claims {
            sub: user_id,
            jti: Uuid::new_v4(),
            iat: now,
            exp: now + self.token_expiry,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Validate a token and return the claims
    pub fn validate_token(&self, token: &str) -> Result<Claims> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)?;
        Ok(token_data.claims)
    }

    /// Get the access token expiry time
    pub fn token_expiry(&self) -> u64 {
        self.token_expiry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn test_service() -> JwtService {
        JwtService::new(&JwtConfig {
            secret: "test-secret".to_string(),
            token_expiry: 1800,
        })
    }

    #[test]
    #[serial]
    fn test_jwt_config_requires_secret() {
        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
        assert!(JwtConfig::from_env().is_err());

        unsafe {
            std::env::set_var("JWT_SECRET", "super-secret");
        }
        let config = JwtConfig::from_env().unwrap();
        assert_eq!(config.secret, "super-secret");
        assert_eq!(config.token_expiry, 1800);

        unsafe {
            std::env::remove_var("JWT_SECRET");
        }
    }

    #[test]
    fn test_generated_token_round_trips() {
        let service = test_service();
        let token = service.generate_token(42).unwrap();
        let claims = service.validate_token(&token).unwrap();

        assert_eq!(claims.sub, 42);
        assert_eq!(claims.exp - claims.iat, 1800);
    }

    #[test]
    fn test_back_to_back_tokens_are_distinct_and_valid() {
        let service = test_service();
        let first = service.generate_token(7).unwrap();
        let second = service.generate_token(7).unwrap();

        assert_ne!(first, second);
        assert_eq!(service.validate_token(&first).unwrap().sub, 7);
        assert_eq!(service.validate_token(&second).unwrap().sub, 7);
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let service = test_service();
        let other = JwtService::new(&JwtConfig {
            secret: "another-secret".to_string(),
            token_expiry: 1800,
        });

        let token = other.generate_token(1).unwrap();
        assert!(service.validate_token(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let service = test_service();
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs();

        // Expired well past the default validation leeway.
        let claims = Claims {
            sub: 1,
            jti: Uuid::new_v4(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service.validate_token(&token).is_err());
    }
}
