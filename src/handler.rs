use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};

use crate::{
    error::AppError,
    model::{Identity, UserInfo},
    schema::{
        CreateTodoSchema, LoginResponse, LoginSchema, MessageResponse, RegisterSchema,
        UpdateTodoSchema,
    },
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    const MESSAGE: &str = "Todo API with Rust, SQLX, SQLite, and Axum";

    let json_response = serde_json::json!({
        "status": "success",
        "message": MESSAGE
    });

    Json(json_response)
}

pub async fn register(
    State(data): State<Arc<AppState>>,
    body: Result<Json<RegisterSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let username = body.username.unwrap_or_default();
    let password = body.password.unwrap_or_default();

    let user = data.credentials.register(&username, &password).await?;
    Ok((StatusCode::CREATED, Json(UserInfo::from(&user))))
}

pub async fn login(
    State(data): State<Arc<AppState>>,
    body: Result<Json<LoginSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let (Some(username), Some(password)) = (body.username, body.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let user = data.credentials.verify(&username, &password).await?;
    let token = data.tokens.issue(user.id, &user.username)?;
    tracing::info!(user_id = user.id, "issued token");

    Ok(Json(LoginResponse {
        token,
        user: UserInfo::from(&user),
    }))
}

// Handler for getting the caller's Todo items
pub async fn get_todos(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let todos = data.todos.list(identity.user_id).await?;
    Ok(Json(todos))
}

// Handler for creating a new Todo
pub async fn create_todo(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    body: Result<Json<CreateTodoSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Json(body) = body?;
    let title = body.title.unwrap_or_default();

    let todo = data.todos.create(identity.user_id, &title).await?;
    Ok((StatusCode::CREATED, Json(todo)))
}

// Handler for updating a Todo by ID
pub async fn update_todo(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateTodoSchema>, JsonRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;
    let Json(changes) = body?;

    let todo = data.todos.update(identity.user_id, id, &changes).await?;
    Ok(Json(todo))
}

// Handler for deleting a Todo by ID
pub async fn delete_todo(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Path(id) = id?;

    data.todos.delete(identity.user_id, id).await?;
    Ok(Json(MessageResponse {
        message: "Todo deleted successfully".to_string(),
    }))
}
