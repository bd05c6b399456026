//! User model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Persisted user record. The password hash never leaves this type;
/// everything the API returns goes through [`UserResponse`].
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password_hash: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New user creation payload. The password is plaintext here; the
/// repository hashes it before insert.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub password: String,
    pub email: Option<String>,
}

/// User representation returned by the API. Carries the transient access
/// token after a successful authentication, and never a password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl UserResponse {
    /// Sanitized view of a stored user, without a token.
    pub fn sanitized(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            token: None,
        }
    }

    /// View of a freshly authenticated user with its access token attached.
    pub fn with_token(user: &User, token: String) -> Self {
        Self {
            token: Some(token),
            ..Self::sanitized(user)
        }
    }
}

/// Credentials posted to `/api/user/authenticate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}
