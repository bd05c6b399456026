//! Todo model and request payloads

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Todo entity
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "PascalCase")]
pub struct Todo {
    pub id: i64,
    pub name: String,
    pub content: String,
    pub is_complete: bool,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// Full-record payload for creating or replacing a todo. There is no
/// partial patch; a PUT replaces every mutable field.
///
/// `name` stays optional at the serde level so that a missing field reaches
/// validation and comes back as a field error instead of a deserialization
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct TodoPayload {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub is_complete: bool,
    #[serde(default)]
    pub user_id: i64,
}
