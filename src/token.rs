//! Stateless identity tokens.
//!
//! Tokens are HS256 JWTs signed with the process secret and carry
//! `{id, username, iat, exp}`. Nothing is stored server side: a token stays
//! valid until its expiry even after the client logs out.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

use crate::model::Identity;

pub const TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub username: String,
    pub iat: u64,
    pub exp: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token missing")]
    Missing,
    #[error("token malformed or signature invalid")]
    Malformed,
    #[error("token expired")]
    Expired,
    #[error("failed to sign token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // expiry is compared against the current time exactly
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: TOKEN_TTL,
        }
    }

    pub fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError> {
        self.issue_at(user_id, username, unix_now())
    }

    /// Sign a token as if issued at `issued_at` (seconds since the epoch).
    pub fn issue_at(
        &self,
        user_id: i64,
        username: &str,
        issued_at: u64,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            id: user_id,
            username: username.to_string(),
            iat: issued_at,
            exp: issued_at + self.ttl.as_secs(),
        };
        Ok(encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?)
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Missing);
        }

        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|err| {
            match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        // jsonwebtoken accepts exp == now; the token is only good strictly before it
        if data.claims.exp <= unix_now() {
            return Err(TokenError::Expired);
        }

        Ok(Identity {
            user_id: data.claims.id,
            username: data.claims.username,
        })
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer.issue(42, "ada").unwrap();
        let identity = issuer.verify(&token).unwrap();
        assert_eq!(
            identity,
            Identity {
                user_id: 42,
                username: "ada".into()
            }
        );
    }

    #[test]
    fn expires_one_hour_after_issue() {
        let issuer = TokenIssuer::new("test-secret");
        let now = unix_now();

        let fresh = issuer.issue_at(1, "ada", now - TOKEN_TTL.as_secs() + 30).unwrap();
        assert!(issuer.verify(&fresh).is_ok());

        let stale = issuer.issue_at(1, "ada", now - TOKEN_TTL.as_secs() - 1).unwrap();
        assert!(matches!(issuer.verify(&stale), Err(TokenError::Expired)));
    }

    #[test]
    fn token_is_dead_at_its_expiry_second() {
        let issuer = TokenIssuer::new("test-secret");
        let token = issuer
            .issue_at(1, "ada", unix_now() - TOKEN_TTL.as_secs())
            .unwrap();
        assert!(matches!(issuer.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn foreign_signature_is_malformed() {
        let ours = TokenIssuer::new("test-secret");
        let theirs = TokenIssuer::new("other-secret");
        let token = theirs.issue(1, "mallory").unwrap();
        assert!(matches!(ours.verify(&token), Err(TokenError::Malformed)));
    }

    #[test]
    fn garbage_and_empty_tokens() {
        let issuer = TokenIssuer::new("test-secret");
        assert!(matches!(issuer.verify("not.a.jwt"), Err(TokenError::Malformed)));
        assert!(matches!(issuer.verify(""), Err(TokenError::Missing)));
    }
}
