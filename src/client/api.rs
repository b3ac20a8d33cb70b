use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::session::{Session, StorageError};
use crate::{
    model::{Todo, TodoChanges, UserInfo},
    schema::{CreateTodoSchema, ErrorResponse, LoginResponse, LoginSchema, RegisterSchema},
};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the session token; the session has been logged out.
    #[error("session expired, please log in again")]
    SessionExpired,
    #[error("{message}")]
    Api { status: StatusCode, message: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// HTTP client for the todo API. Session state is passed in per call.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn register(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, ClientError> {
        let body = RegisterSchema {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        let request = self.http.post(self.url("/auth/register")).json(&body);
        self.send(session, request).await
    }

    /// Log in and store the returned token and user in `session`.
    pub async fn login(
        &self,
        session: &mut Session,
        username: &str,
        password: &str,
    ) -> Result<UserInfo, ClientError> {
        let body = LoginSchema {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        let request = self.http.post(self.url("/auth/login")).json(&body);
        let LoginResponse { token, user } = self.send(session, request).await?;
        session.login(token, user.clone())?;
        Ok(user)
    }

    pub async fn list_todos(&self, session: &mut Session) -> Result<Vec<Todo>, ClientError> {
        let request = self.authorized(session, self.http.get(self.url("/todos")));
        self.send(session, request).await
    }

    pub async fn create_todo(
        &self,
        session: &mut Session,
        title: &str,
    ) -> Result<Todo, ClientError> {
        let body = CreateTodoSchema {
            title: Some(title.to_string()),
        };
        let request = self.http.post(self.url("/todos")).json(&body);
        let request = self.authorized(session, request);
        self.send(session, request).await
    }

    pub async fn update_todo(
        &self,
        session: &mut Session,
        id: i64,
        changes: &TodoChanges,
    ) -> Result<Todo, ClientError> {
        let request = self.http.put(self.url(&format!("/todos/{id}"))).json(changes);
        let request = self.authorized(session, request);
        self.send(session, request).await
    }

    pub async fn delete_todo(&self, session: &mut Session, id: i64) -> Result<(), ClientError> {
        let request = self.http.delete(self.url(&format!("/todos/{id}")));
        let request = self.authorized(session, request);
        let _: serde_json::Value = self.send(session, request).await?;
        Ok(())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, session: &Session, request: RequestBuilder) -> RequestBuilder {
        match session.token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            tracing::debug!(%status, "session rejected, logging out");
            session.logout()?;
            return Err(ClientError::SessionExpired);
        }

        if !status.is_success() {
            return Err(api_error(status, response).await);
        }

        Ok(response.json::<T>().await?)
    }
}

async fn api_error(status: StatusCode, response: Response) -> ClientError {
    let message = match response.json::<ErrorResponse>().await {
        Ok(body) => body.error,
        Err(_) => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    ClientError::Api { status, message }
}
