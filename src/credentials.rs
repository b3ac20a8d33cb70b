use std::sync::Arc;

use sqlx::query_as;
use tokio::sync::OnceCell;

use crate::{db::Db, model::User};

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("username already exists")]
    DuplicateUsername,
    // unknown user and wrong password must stay indistinguishable
    #[error("invalid username or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Usernames with salted bcrypt password hashes.
#[derive(Clone)]
pub struct CredentialStore {
    db: Db,
    cost: u32,
    // verified against for unknown usernames so both failures cost a bcrypt run
    dummy_hash: Arc<OnceCell<String>>,
}

impl CredentialStore {
    pub fn new(db: Db, cost: u32) -> Self {
        Self {
            db,
            cost,
            dummy_hash: Arc::new(OnceCell::new()),
        }
    }

    pub async fn register(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        if username.trim().is_empty() || password.trim().is_empty() {
            return Err(CredentialError::InvalidInput(
                "Username and password are required",
            ));
        }

        if self.find(username).await?.is_some() {
            return Err(CredentialError::DuplicateUsername);
        }

        let cost = self.cost;
        let password = password.to_string();
        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;

        let user = query_as::<_, User>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| {
            // lost a race with a concurrent registration of the same name
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return CredentialError::DuplicateUsername;
                }
            }
            CredentialError::Storage(e)
        })?;

        tracing::info!(user_id = user.id, "registered user");
        Ok(user)
    }

    pub async fn verify(&self, username: &str, password: &str) -> Result<User, CredentialError> {
        let Some(user) = self.find(username).await? else {
            tracing::debug!("login for unknown username");
            let dummy = self.dummy_hash().await?.to_string();
            check_password(password, dummy).await?;
            return Err(CredentialError::InvalidCredentials);
        };

        if !check_password(password, user.password_hash.clone()).await? {
            tracing::debug!(user_id = user.id, "login with wrong password");
            return Err(CredentialError::InvalidCredentials);
        }

        Ok(user)
    }

    async fn dummy_hash(&self) -> Result<&str, CredentialError> {
        let cost = self.cost;
        let hash = self
            .dummy_hash
            .get_or_try_init(|| async move {
                tokio::task::spawn_blocking(move || bcrypt::hash("not-a-real-password", cost))
                    .await?
                    .map_err(CredentialError::from)
            })
            .await?;
        Ok(hash.as_str())
    }

    async fn find(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await
    }
}

async fn check_password(password: &str, hash: String) -> Result<bool, CredentialError> {
    let password = password.to_string();
    Ok(tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    async fn store() -> CredentialStore {
        let pool = db::connect_in_memory().await.unwrap();
        db::init_schema(&pool).await.unwrap();
        CredentialStore::new(pool, 4)
    }

    #[tokio::test]
    async fn register_then_verify() {
        let store = store().await;
        let user = store.register("ada", "lovelace").await.unwrap();
        assert_eq!(user.username, "ada");
        assert_ne!(user.password_hash, "lovelace");
        assert!(user.password_hash.starts_with("$2"));

        let verified = store.verify("ada", "lovelace").await.unwrap();
        assert_eq!(verified.id, user.id);
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = store().await;
        store.register("ada", "one").await.unwrap();
        let err = store.register("ada", "two").await.unwrap_err();
        assert!(matches!(err, CredentialError::DuplicateUsername));
    }

    #[tokio::test]
    async fn empty_fields_are_invalid() {
        let store = store().await;
        assert!(matches!(
            store.register("", "pw").await,
            Err(CredentialError::InvalidInput(_))
        ));
        assert!(matches!(
            store.register("ada", "  ").await,
            Err(CredentialError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let store = store().await;
        store.register("ada", "lovelace").await.unwrap();

        let wrong = store.verify("ada", "babbage").await.unwrap_err();
        let unknown = store.verify("grace", "lovelace").await.unwrap_err();
        assert!(matches!(wrong, CredentialError::InvalidCredentials));
        assert!(matches!(unknown, CredentialError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn unknown_user_still_runs_bcrypt() {
        let store = store().await;
        assert!(store.dummy_hash.get().is_none());

        let err = store.verify("ghost", "whatever").await.unwrap_err();
        assert!(matches!(err, CredentialError::InvalidCredentials));
        let dummy = store.dummy_hash.get().unwrap();
        assert!(dummy.starts_with("$2"));
        assert!(!bcrypt::verify("whatever", dummy).unwrap());
    }
}
