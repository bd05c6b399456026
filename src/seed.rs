//! Schema creation and initial data

use anyhow::Result;
use sqlx::SqlitePool;
use tracing::info;

use crate::models::{NewUser, TodoPayload};
use crate::repositories::{TodoRepository, UserRepository};

/// Password shared by the seed users, hashed at seed time.
pub const SEED_PASSWORD: &str = "password123";

/// Create the tables if they do not exist yet.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            email TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            is_complete BOOLEAN NOT NULL DEFAULT 0,
            user_id INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Seed initial users and todos. Does nothing when any records exist.
pub async fn seed(users: &UserRepository, todos: &TodoRepository) -> Result<()> {
    if users.count().await? > 0 || todos.count().await? > 0 {
        info!("Database already seeded");
        return Ok(());
    }

    let seed_users = [
        ("John", "Doe", "johndoe", "john.doe@contoso.com"),
        ("Jane", "Doe", "janedoe", "jane.doe@contoso.com"),
        ("James", "Randi", "jrandi", "jrandi@strand.edu"),
    ];

    for (first_name, last_name, username, email) in seed_users {
        users
            .create(&NewUser {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
                username: username.to_string(),
                password: SEED_PASSWORD.to_string(),
                email: Some(email.to_string()),
            })
            .await?;
    }

    let seed_todos = [
        ("Monday", "You can fall apart.", true, 1),
        ("Tuesday", "Break My Heart", true, 2),
        ("Wednesday", "Break My Heart Pt.2", true, 3),
        ("Thursday", "Doesn't even start.", false, 2),
        ("Friday", "I'm in love.", false, 1),
    ];

    for (name, content, is_complete, user_id) in seed_todos {
        todos
            .create(&TodoPayload {
                name: Some(name.to_string()),
                content: content.to_string(),
                is_complete,
                user_id,
            })
            .await?;
    }

    info!(
        "Seeded {} users and {} todos",
        seed_users.len(),
        seed_todos.len()
    );
    Ok(())
}
