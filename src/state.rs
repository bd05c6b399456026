//! Application state shared across handlers

use sqlx::SqlitePool;

use crate::{
    auth::AuthService,
    ip_filter::IpAllowList,
    jwt::JwtService,
    repositories::{TodoRepository, UserRepository},
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: SqlitePool,
    pub todo_repository: TodoRepository,
    pub user_repository: UserRepository,
    pub auth_service: AuthService,
    pub jwt_service: JwtService,
    pub allow_list: IpAllowList,
}
