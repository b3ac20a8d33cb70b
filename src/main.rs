use std::{net::SocketAddr, sync::Arc};

use axum::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use todo_auth_api::{config::Config, db, route::create_app, AppState};

// Entry point of the application
#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_auth_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Refuse to start without a signing secret
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %err, "invalid configuration");
            std::process::exit(1);
        }
    };

    let pool = match db::connect(&config.database_url).await {
        Ok(pool) => pool,
        Err(err) => {
            tracing::error!(error = %err, "failed to connect to the database");
            std::process::exit(1);
        }
    };

    if let Err(err) = db::init_schema(&pool).await {
        tracing::error!(error = %err, "database initialization failed");
        std::process::exit(1);
    }

    let app_state = Arc::new(AppState::new(pool, &config));
    let app = create_app(app_state, config.cors_origin.as_deref());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(%addr, "server started");

    if let Err(err) = Server::bind(&addr).serve(app.into_make_service()).await {
        tracing::error!(error = %err, "server error");
        std::process::exit(1);
    }
}
