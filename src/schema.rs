use serde::{Deserialize, Serialize};

use crate::model::UserInfo;

// Request body for registering a user. Fields are optional so a missing
// field is reported as a 400 instead of a deserialization failure.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct RegisterSchema {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LoginSchema {
    pub username: Option<String>,
    pub password: Option<String>,
}

// Request body for creating a new Todo
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct CreateTodoSchema {
    pub title: Option<String>,
}

// Request body for updating a Todo: every field is optional
pub type UpdateTodoSchema = crate::model::TodoChanges;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
