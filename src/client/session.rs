//! Client-side login state.
//!
//! A [`Session`] is an explicit object handed to whatever needs it (the API
//! client, views). It writes through to a [`SessionStore`] so a restart
//! restores the login.

use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::model::UserInfo;

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error("storage file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Durable string key/value storage.
pub trait SessionStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Store backed by a JSON object in a file, rewritten on every change.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(raw) if raw.trim().is_empty() => BTreeMap::new(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, entries })
    }

    fn flush(&self) -> Result<(), StorageError> {
        fs::write(&self.path, serde_json::to_string_pretty(&self.entries)?)?;
        Ok(())
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.entries.remove(key).is_some() {
            self.flush()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<UserInfo>,
    pub is_authenticated: bool,
}

pub struct Session {
    state: SessionState,
    store: Box<dyn SessionStore>,
}

impl Session {
    /// Rebuild the session from whatever `store` holds.
    pub fn restore(store: impl SessionStore + 'static) -> Self {
        let token = store.get(TOKEN_KEY);
        let user = store.get(USER_KEY).and_then(|raw| {
            serde_json::from_str::<UserInfo>(&raw)
                .map_err(|err| tracing::warn!(error = %err, "discarding stored user"))
                .ok()
        });

        let state = match (token, user) {
            (Some(token), Some(user)) => SessionState {
                token: Some(token),
                user: Some(user),
                is_authenticated: true,
            },
            _ => SessionState::default(),
        };

        Self {
            state,
            store: Box::new(store),
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserInfo> {
        self.state.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated
    }

    pub fn login(&mut self, token: String, user: UserInfo) -> Result<(), StorageError> {
        self.store.set(TOKEN_KEY, &token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&user)?)?;
        self.state = SessionState {
            token: Some(token),
            user: Some(user),
            is_authenticated: true,
        };
        Ok(())
    }

    /// Forget the login. In-memory state is cleared and both keys are
    /// removed even if the store fails; the first failure is returned.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        self.state = SessionState::default();
        let token = self.store.remove(TOKEN_KEY);
        let user = self.store.remove(USER_KEY);
        token.and(user)
    }
}
