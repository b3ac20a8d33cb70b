//! Client side of the todo API: login state, HTTP calls and view state.

pub mod api;
pub mod board;
pub mod navigation;
pub mod session;

pub use api::{ApiClient, ClientError};
pub use board::TodoBoard;
pub use navigation::{resolve, Navigation, View};
pub use session::{FileStore, MemoryStore, Session, SessionState, SessionStore, StorageError};
