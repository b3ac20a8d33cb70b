use std::sync::Arc;

use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{handler::*, middleware::mw_require_auth, AppState};

pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/todos", get(get_todos).post(create_todo))
        .route("/todos/:id", put(update_todo).delete(delete_todo))
        .route_layer(from_fn_with_state(app_state.clone(), mw_require_auth))
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/", get(health_checker_handler))
        .with_state(app_state)
}

/// Allow only `origin` when given, any origin otherwise.
pub fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE]);

    let Some(origin) = origin else {
        return cors.allow_origin(Any);
    };
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin).allow_credentials(true),
        Err(_) => {
            tracing::warn!(origin, "ignoring unparsable CORS origin");
            cors.allow_origin(Any)
        }
    }
}

/// The router with CORS and request tracing applied, as served by `main`.
pub fn create_app(app_state: Arc<AppState>, cors_origin: Option<&str>) -> Router {
    create_router(app_state)
        .layer(cors_layer(cors_origin))
        .layer(TraceLayer::new_for_http())
}
