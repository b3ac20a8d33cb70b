use super::{
    api::{ApiClient, ClientError},
    navigation::Navigation,
    session::Session,
};
use crate::model::{Todo, TodoChanges};

/// View state of the todo list screen.
///
/// A rejected session sends the caller back to the login view; any other
/// failure is recorded in `error` and the list is left as it was.
#[derive(Debug)]
pub struct TodoBoard {
    api: ApiClient,
    pub todos: Vec<Todo>,
    pub error: Option<String>,
    pub loading: bool,
}

impl TodoBoard {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            todos: Vec::new(),
            error: None,
            loading: true,
        }
    }

    pub async fn refresh(&mut self, session: &mut Session) -> Navigation {
        let result = self.api.list_todos(session).await;
        self.loading = false;
        match result {
            Ok(todos) => {
                self.todos = todos;
                Navigation::Stay
            }
            Err(err) => self.fail(err),
        }
    }

    pub async fn add(&mut self, session: &mut Session, title: &str) -> Navigation {
        match self.api.create_todo(session, title).await {
            Ok(todo) => {
                self.todos.push(todo);
                Navigation::Stay
            }
            Err(err) => self.fail(err),
        }
    }

    pub async fn toggle(&mut self, session: &mut Session, id: i64) -> Navigation {
        let Some(completed) = self.todos.iter().find(|t| t.id == id).map(|t| t.completed) else {
            return Navigation::Stay;
        };
        let changes = TodoChanges {
            completed: Some(!completed),
            ..Default::default()
        };
        self.update(session, id, changes).await
    }

    /// Save an edited title. Blank edits are ignored.
    pub async fn rename(&mut self, session: &mut Session, id: i64, title: &str) -> Navigation {
        let title = title.trim();
        if title.is_empty() {
            return Navigation::Stay;
        }
        let changes = TodoChanges {
            title: Some(title.to_string()),
            ..Default::default()
        };
        self.update(session, id, changes).await
    }

    pub async fn remove(&mut self, session: &mut Session, id: i64) -> Navigation {
        match self.api.delete_todo(session, id).await {
            Ok(()) => {
                self.todos.retain(|t| t.id != id);
                Navigation::Stay
            }
            Err(err) => self.fail(err),
        }
    }

    pub fn logout(&mut self, session: &mut Session) -> Navigation {
        if let Err(err) = session.logout() {
            tracing::warn!(error = %err, "failed to clear stored session");
        }
        self.todos.clear();
        Navigation::Login
    }

    async fn update(&mut self, session: &mut Session, id: i64, changes: TodoChanges) -> Navigation {
        match self.api.update_todo(session, id, &changes).await {
            Ok(updated) => {
                if let Some(slot) = self.todos.iter_mut().find(|t| t.id == id) {
                    *slot = updated;
                }
                Navigation::Stay
            }
            Err(err) => self.fail(err),
        }
    }

    fn fail(&mut self, err: ClientError) -> Navigation {
        match err {
            ClientError::SessionExpired => {
                self.todos.clear();
                Navigation::Login
            }
            other => {
                self.error = Some(other.to_string());
                Navigation::Stay
            }
        }
    }
}
