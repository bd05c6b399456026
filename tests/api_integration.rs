//! End-to-end tests driving the full router over loopback against an
//! in-memory SQLite store.

use std::net::SocketAddr;
use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use todo_api::{
    auth::AuthService,
    ip_filter::IpAllowList,
    jwt::{JwtConfig, JwtService},
    repositories::{TodoRepository, UserRepository},
    routes, seed,
    state::AppState,
};

/// Spin up a server on an ephemeral loopback port. The in-memory database
/// lives in a single pooled connection that is never recycled.
async fn spawn_server(allow_list: &str, seeded: bool) -> (SocketAddr, AppState) {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None::<Duration>)
        .max_lifetime(None::<Duration>)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    seed::init_schema(&pool).await.unwrap();

    let user_repository = UserRepository::new(pool.clone());
    let todo_repository = TodoRepository::new(pool.clone());
    if seeded {
        seed::seed(&user_repository, &todo_repository).await.unwrap();
    }

    let jwt_service = JwtService::new(&JwtConfig {
        secret: "integration-test-secret".to_string(),
        token_expiry: 1800,
    });
    let auth_service = AuthService::new(user_repository.clone(), jwt_service.clone());

    let state = AppState {
        db_pool: pool,
        todo_repository,
        user_repository,
        auth_service,
        jwt_service,
        allow_list: IpAllowList::parse(allow_list),
    };

    let app = routes::create_router(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    (addr, state)
}

#[tokio::test]
async fn test_create_todo_and_follow_location() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/todo", addr))
        .json(&serde_json::json!({ "Name": "Buy milk", "Content": "" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 201);
    let location = response
        .headers()
        .get("location")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();

    let fetched = client
        .get(format!("http://{}{}", addr, location))
        .send()
        .await
        .unwrap();
    assert_eq!(fetched.status(), 200);

    let body: serde_json::Value = fetched.json().await.unwrap();
    assert_eq!(body["Name"], "Buy milk");
    assert_eq!(body["IsComplete"], false);
}

#[tokio::test]
async fn test_get_todos_returns_seeded_records() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;

    let body: serde_json::Value = reqwest::get(format!("http://{}/api/todo", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let todos = body.as_array().unwrap();
    assert_eq!(todos.len(), 5);
    assert_eq!(todos[0]["Name"], "Monday");
}

#[tokio::test]
async fn test_get_todos_on_empty_store_is_bad_request() {
    let (addr, _) = spawn_server("127.0.0.1;::1", false).await;

    let response = reqwest::get(format!("http://{}/api/todo", addr)).await.unwrap();
    assert_eq!(response.status(), 400);

    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_get_missing_todo_is_not_found() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;

    let response = reqwest::get(format!("http://{}/api/todo/999", addr)).await.unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_create_todo_without_name_returns_field_errors() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/todo", addr))
        .json(&serde_json::json!({ "Content": "No name here" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["Field"], "Name");
}

#[tokio::test]
async fn test_update_todo_replaces_record() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("http://{}/api/todo/1", addr))
        .json(&serde_json::json!({
            "Name": "Monday rewritten",
            "Content": "Replaced",
            "IsComplete": false,
            "UserId": 1
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let body: serde_json::Value = reqwest::get(format!("http://{}/api/todo/1", addr))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["Name"], "Monday rewritten");
    assert_eq!(body["IsComplete"], false);
}

#[tokio::test]
async fn test_update_missing_todo_is_not_found() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .put(format!("http://{}/api/todo/999", addr))
        .json(&serde_json::json!({ "Name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_delete_missing_todo_is_not_found() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("http://{}/api/todo/999", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_delete_todo_succeeds() {
    let (addr, state) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .delete(format!("http://{}/api/todo/1", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);
    assert_eq!(state.todo_repository.count().await.unwrap(), 4);
}

#[tokio::test]
async fn test_authenticate_returns_token_without_password() {
    let (addr, state) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("http://{}/api/user/authenticate", addr))
        .json(&serde_json::json!({
            "Username": "johndoe",
            "Password": seed::SEED_PASSWORD
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let text = response.text().await.unwrap();
    assert!(!text.contains("Password"));

    let body: serde_json::Value = serde_json::from_str(&text).unwrap();
    let token = body["Token"].as_str().unwrap();
    let claims = state.jwt_service.validate_token(token).unwrap();
    assert_eq!(claims.sub, body["Id"].as_i64().unwrap());
    assert_eq!(claims.exp - claims.iat, 1800);
}

#[tokio::test]
async fn test_authentication_failures_are_indistinguishable() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let wrong_password = client
        .post(format!("http://{}/api/user/authenticate", addr))
        .json(&serde_json::json!({ "Username": "johndoe", "Password": "wrong" }))
        .send()
        .await
        .unwrap();
    let unknown_user = client
        .post(format!("http://{}/api/user/authenticate", addr))
        .json(&serde_json::json!({ "Username": "nobody", "Password": "wrong" }))
        .send()
        .await
        .unwrap();

    assert_eq!(wrong_password.status(), 400);
    assert_eq!(unknown_user.status(), 400);

    let first = wrong_password.text().await.unwrap();
    let second = unknown_user.text().await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_get_all_users_requires_bearer_token() {
    let (addr, _) = spawn_server("127.0.0.1;::1", true).await;
    let client = reqwest::Client::new();

    let unauthorized = client
        .get(format!("http://{}/api/user/GetAllUsers", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(unauthorized.status(), 401);

    let auth: serde_json::Value = client
        .post(format!("http://{}/api/user/authenticate", addr))
        .json(&serde_json::json!({
            "Username": "janedoe",
            "Password": seed::SEED_PASSWORD
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let token = auth["Token"].as_str().unwrap();

    let response = client
        .get(format!("http://{}/api/user/GetAllUsers", addr))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let text = response.text().await.unwrap();
    assert!(!text.contains("Password"));

    let users: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(users.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_gatekeeper_rejects_unlisted_address_without_side_effects() {
    let (addr, state) = spawn_server("10.9.8.7", true).await;
    let client = reqwest::Client::new();

    let listing = reqwest::get(format!("http://{}/api/todo", addr)).await.unwrap();
    assert_eq!(listing.status(), 403);

    let create = client
        .post(format!("http://{}/api/todo", addr))
        .json(&serde_json::json!({ "Name": "Should not exist" }))
        .send()
        .await
        .unwrap();
    assert_eq!(create.status(), 403);

    // The protected handler never ran: nothing was created.
    assert_eq!(state.todo_repository.count().await.unwrap(), 5);

    // The user controller is not IP-gated.
    let auth = client
        .post(format!("http://{}/api/user/authenticate", addr))
        .json(&serde_json::json!({
            "Username": "johndoe",
            "Password": seed::SEED_PASSWORD
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(auth.status(), 200);
}

#[tokio::test]
async fn test_gatekeeper_fails_closed_on_malformed_entry() {
    let (addr, _) = spawn_server("127.0.0.1;bogus-entry", true).await;

    let response = reqwest::get(format!("http://{}/api/todo", addr)).await.unwrap();
    assert_eq!(response.status(), 403);
}
