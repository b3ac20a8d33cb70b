use sqlx::{query, query_as};

use crate::{
    db::Db,
    model::{Todo, TodoChanges},
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("todo not found or unauthorized")]
    NotFoundOrUnauthorized,
    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Todo storage. Every query is scoped to the owner passed in, so a todo
/// belonging to another user behaves exactly like one that doesn't exist.
#[derive(Clone)]
pub struct TodoRepository {
    db: Db,
}

impl TodoRepository {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list(&self, owner_id: i64) -> Result<Vec<Todo>, RepositoryError> {
        let todos = query_as::<_, Todo>(
            "SELECT id, title, completed, owner_id FROM todos WHERE owner_id = ?",
        )
        .bind(owner_id)
        .fetch_all(&self.db)
        .await?;
        Ok(todos)
    }

    pub async fn create(&self, owner_id: i64, title: &str) -> Result<Todo, RepositoryError> {
        if title.trim().is_empty() {
            return Err(RepositoryError::InvalidInput("Title is required"));
        }

        let todo = query_as::<_, Todo>(
            "INSERT INTO todos (title, completed, owner_id) VALUES (?, 0, ?) RETURNING id, title, completed, owner_id",
        )
        .bind(title)
        .bind(owner_id)
        .fetch_one(&self.db)
        .await?;

        tracing::debug!(todo_id = todo.id, owner_id, "created todo");
        Ok(todo)
    }

    /// Apply `changes` to the owner's todo `id`. Fields left as `None` keep
    /// their stored value; the owner check and the write are one statement.
    pub async fn update(
        &self,
        owner_id: i64,
        id: i64,
        changes: &TodoChanges,
    ) -> Result<Todo, RepositoryError> {
        if matches!(&changes.title, Some(title) if title.trim().is_empty()) {
            return Err(RepositoryError::InvalidInput("Title must not be empty"));
        }

        let updated = query_as::<_, Todo>(
            "UPDATE todos SET title = COALESCE(?, title), completed = COALESCE(?, completed) WHERE id = ? AND owner_id = ? RETURNING id, title, completed, owner_id",
        )
        .bind(changes.title.as_deref())
        .bind(changes.completed)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or(RepositoryError::NotFoundOrUnauthorized)?;

        Ok(updated)
    }

    pub async fn delete(&self, owner_id: i64, id: i64) -> Result<(), RepositoryError> {
        let rows_affected = query("DELETE FROM todos WHERE id = ? AND owner_id = ?")
            .bind(id)
            .bind(owner_id)
            .execute(&self.db)
            .await?
            .rows_affected();
        if rows_affected == 0 {
            return Err(RepositoryError::NotFoundOrUnauthorized);
        }

        tracing::debug!(todo_id = id, owner_id, "deleted todo");
        Ok(())
    }
}
