pub mod client;
pub mod config;
pub mod credentials;
pub mod db;
pub mod error;
pub mod handler;
pub mod middleware;
pub mod model;
pub mod repository;
pub mod route;
pub mod schema;
pub mod token;

use config::Config;
use credentials::CredentialStore;
use db::Db;
use repository::TodoRepository;
use token::TokenIssuer;

// Struct representing the application state
pub struct AppState {
    pub credentials: CredentialStore,
    pub tokens: TokenIssuer,
    pub todos: TodoRepository,
}

impl AppState {
    pub fn new(db: Db, config: &Config) -> Self {
        Self {
            credentials: CredentialStore::new(db.clone(), config.bcrypt_cost),
            tokens: TokenIssuer::new(&config.jwt_secret),
            todos: TodoRepository::new(db),
        }
    }
}
