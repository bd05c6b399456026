//! Authenticator: credential check and access-token issuance

use tracing::{info, warn};

use crate::{
    error::ApiError, jwt::JwtService, models::UserResponse, repositories::UserRepository,
};

/// Authenticates users against the credential store and mints access tokens.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    jwt: JwtService,
}

impl AuthService {
    /// Create a new authenticator
    pub fn new(users: UserRepository, jwt: JwtService) -> Self {
        Self { users, jwt }
    }

    /// Check the supplied credentials and, on success, return the user with
    /// a fresh access token attached.
    ///
    /// Failures are uniform: an unknown username and a wrong password
    /// produce the same error, so the caller cannot probe for account
    /// existence. Read-only; nothing is persisted.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<UserResponse, ApiError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            warn!("Authentication failed for username {:?}", username);
            return Err(ApiError::InvalidCredentials);
        };

        if !self.users.verify_password(&user, password)? {
            warn!("Authentication failed for username {:?}", username);
            return Err(ApiError::InvalidCredentials);
        }

        let token = self.jwt.generate_token(user.id)?;
        info!("Issued access token for user {}", user.id);

        Ok(UserResponse::with_token(&user, token))
    }
}
