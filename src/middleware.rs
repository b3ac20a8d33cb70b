use std::sync::Arc;

use axum::{
    extract::State,
    http::{self, Request},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, token::TokenError, AppState};

/// Gate for every todo route: a missing token is 401, an invalid or expired
/// one is 403, and a valid one attaches the [`Identity`](crate::model::Identity)
/// to the request extensions.
pub async fn mw_require_auth<B>(
    State(state): State<Arc<AppState>>,
    mut request: Request<B>,
    next: Next<B>,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(bearer_token);

    let Some(token) = token else {
        tracing::debug!(path = %request.uri().path(), "request without token");
        return Err(AppError::Unauthorized);
    };

    let identity = state.tokens.verify(token).map_err(|err| {
        if !matches!(err, TokenError::Missing) {
            tracing::warn!(error = %err, "rejected token");
        }
        AppError::from(err)
    })?;

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

// "Bearer <token>": the credential is the second word of the header
fn bearer_token(header: &str) -> Option<&str> {
    header.split_whitespace().nth(1)
}

#[cfg(test)]
mod tests {
    use super::bearer_token;

    #[test]
    fn extracts_second_word() {
        assert_eq!(bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(bearer_token("Bearer"), None);
        assert_eq!(bearer_token(""), None);
    }
}
