//! API routes and handlers

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use tracing::info;

use crate::{
    error::ApiError,
    ip_filter::client_ip_filter,
    middleware::require_auth,
    models::{AuthRequest, TodoPayload, UserResponse},
    state::AppState,
    validation,
};

/// Create the router for the todo API
pub fn create_router(state: AppState) -> Router {
    // The whole todo controller sits behind the IP allow-list gate.
    let todo_routes = Router::new()
        .route("/", get(get_todos).post(create_todo))
        .route(
            "/:id",
            get(get_todo).put(update_todo).delete(delete_todo),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            client_ip_filter,
        ));

    let user_routes = Router::new()
        .route("/GetAllUsers", get(get_all_users))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .route("/authenticate", post(authenticate));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/todo", todo_routes)
        .nest("/api/user", user_routes)
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "todo-api"
    }))
}

/// Get all todos
pub async fn get_todos(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let todos = state.todo_repository.list().await?;

    if todos.is_empty() {
        return Err(ApiError::BadRequest("No todo items found.".to_string()));
    }

    Ok(Json(todos))
}

/// Get a todo by ID
pub async fn get_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let todo = state
        .todo_repository
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Todo with ID {} not found.", id)))?;

    Ok(Json(todo))
}

/// Create a todo. Responds 201 with a Location header pointing at the new
/// record's GET route.
pub async fn create_todo(
    State(state): State<AppState>,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::BadRequest("No data given.".to_string()))?;

    validation::validate_todo(&payload).map_err(ApiError::Validation)?;

    let todo = state.todo_repository.create(&payload).await?;
    info!("Created todo {} ({:?})", todo.id, todo.name);

    let location = format!("/api/todo/{}", todo.id);
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(todo),
    ))
}

/// Replace a todo by ID (full-record replacement, no partial patch)
pub async fn update_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<TodoPayload>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::BadRequest("No data given.".to_string()))?;

    validation::validate_todo(&payload).map_err(ApiError::Validation)?;

    if !state.todo_repository.update(id, &payload).await? {
        return Err(ApiError::NotFound(format!("Todo with ID {} not found.", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a todo by ID
pub async fn delete_todo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.todo_repository.delete(id).await? {
        return Err(ApiError::NotFound(format!("Todo with ID {} not found.", id)));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Authenticate a user and return it with a fresh access token
pub async fn authenticate(
    State(state): State<AppState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) =
        payload.map_err(|_| ApiError::BadRequest("No data given.".to_string()))?;

    let user = state
        .auth_service
        .authenticate(&payload.username, &payload.password)
        .await?;

    Ok(Json(user))
}

/// Get all users, sanitized: passwords are never serialized
pub async fn get_all_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let users = state.user_repository.get_all().await?;
    let sanitized: Vec<UserResponse> = users.iter().map(UserResponse::sanitized).collect();

    Ok(Json(sanitized))
}
