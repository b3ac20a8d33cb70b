#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use todo_auth_api::{config::Config, db, route::create_router, AppState};
use tower::ServiceExt;

pub const SECRET: &str = "integration-secret";

pub fn test_config() -> Config {
    Config {
        port: 0,
        jwt_secret: SECRET.to_string(),
        database_url: "sqlite::memory:".to_string(),
        cors_origin: None,
        bcrypt_cost: 4,
    }
}

pub async fn test_app() -> Router {
    let pool = db::connect_in_memory().await.unwrap();
    db::init_schema(&pool).await.unwrap();
    create_router(Arc::new(AppState::new(pool, &test_config())))
}

/// App state over a real SQLite file in `dir`, with the production pool size.
pub async fn file_backed_state(dir: &std::path::Path) -> Arc<AppState> {
    let url = format!("sqlite://{}", dir.join("todos.db").display());
    let pool = db::connect(&url).await.unwrap();
    db::init_schema(&pool).await.unwrap();
    Arc::new(AppState::new(pool, &test_config()))
}

pub fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> impl std::future::Future<Output = (StatusCode, Value)> + Send + 'static {
    // `Router` is not `Sync`, so clone it and build the request before the
    // future is created; the returned future then owns everything it needs.
    let app = app.clone();
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => request
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    async move {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }
}

/// Register `username` and return a fresh login token for it.
pub async fn register_and_login(app: &Router, username: &str) -> (i64, String) {
    let creds = serde_json::json!({ "username": username, "password": "hunter2" });
    let (status, user) = call(app, Method::POST, "/auth/register", None, Some(creds.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, login) = call(app, Method::POST, "/auth/login", None, Some(creds)).await;
    assert_eq!(status, StatusCode::OK);
    (
        user["id"].as_i64().unwrap(),
        login["token"].as_str().unwrap().to_string(),
    )
}
