//! Session validation against the identity API.

use skyfare_client::{ApiClient, ApiError, BearerCredential, TokenPair, User};

use crate::store::TokenStore;

/// A validated session: both tokens plus the user they belong to.
#[derive(Debug, Clone)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub user: User,
}

impl Session {
    pub fn tokens(&self) -> TokenPair {
        TokenPair {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        }
    }
}

impl BearerCredential for Session {
    fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// Why a request does or does not carry a usable session.
#[derive(Debug)]
pub enum SessionStatus {
    /// Either token is absent. The identity API was not called.
    Missing,
    /// The identity API refused the access token, or answered with
    /// something that is not a user.
    Rejected(ApiError),
    /// The identity API could not be reached.
    Unreachable(ApiError),
    Valid(Session),
}

impl SessionStatus {
    pub fn into_session(self) -> Option<Session> {
        match self {
            SessionStatus::Valid(session) => Some(session),
            _ => None,
        }
    }
}

/// Checks stored tokens against `GET /auth/me`.
#[derive(Debug, Clone)]
pub struct SessionValidator {
    client: ApiClient,
}

impl SessionValidator {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Current session or None. Fails closed on every error.
    pub async fn validate(&self, store: &TokenStore) -> Option<Session> {
        self.validate_tokens(store.tokens()).await
    }

    pub async fn validate_tokens(&self, tokens: Option<TokenPair>) -> Option<Session> {
        self.inspect_tokens(tokens).await.into_session()
    }

    /// Like [`validate`](Self::validate), but reports why there is no session.
    pub async fn inspect(&self, store: &TokenStore) -> SessionStatus {
        self.inspect_tokens(store.tokens()).await
    }

    pub async fn inspect_tokens(&self, tokens: Option<TokenPair>) -> SessionStatus {
        let Some(tokens) = tokens else {
            return SessionStatus::Missing;
        };

        match self.client.me(&tokens).await {
            Ok(user) => SessionStatus::Valid(Session {
                access_token: tokens.access_token,
                refresh_token: tokens.refresh_token,
                user,
            }),
            Err(e) if e.is_unreachable() => {
                tracing::warn!(error = %e, "identity API unreachable");
                SessionStatus::Unreachable(e)
            }
            Err(e) => {
                tracing::debug!(status = ?e.status(), error = %e, "session rejected");
                SessionStatus::Rejected(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;
    use skyfare_client::testing::spawn_backend;

    use super::*;

    /// Identity API that accepts only `Bearer good` and counts calls.
    async fn identity_api() -> (ApiClient, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/auth/me",
            get(move |headers: HeaderMap| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let auth = headers.get("authorization").and_then(|v| v.to_str().ok());
                    if auth == Some("Bearer good") {
                        Ok(Json(json!({"id": "u1", "username": "alice", "password": "x"})))
                    } else {
                        Err(StatusCode::UNAUTHORIZED)
                    }
                }
            }),
        );
        (ApiClient::new(spawn_backend(router).await), calls)
    }

    fn pair(a: &str, r: &str) -> TokenPair {
        TokenPair { access_token: a.into(), refresh_token: r.into() }
    }

    #[tokio::test]
    async fn missing_token_skips_identity_api() {
        let (client, calls) = identity_api().await;
        let validator = SessionValidator::new(client);

        assert!(validator.validate(&TokenStore::default()).await.is_none());
        assert!(matches!(validator.inspect_tokens(None).await, SessionStatus::Missing));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn set_then_validate_returns_same_tokens() {
        let (client, calls) = identity_api().await;
        let validator = SessionValidator::new(client);

        let mut store = TokenStore::default();
        store.set(&pair("good", "r"));
        let session = validator.validate(&store).await.unwrap();

        assert_eq!(session.access_token, "good");
        assert_eq!(session.refresh_token, "r");
        assert_eq!(session.user.username, "alice");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_token_is_none() {
        let (client, _) = identity_api().await;
        let validator = SessionValidator::new(client);

        let status = validator.inspect_tokens(Some(pair("stale", "r"))).await;
        match status {
            SessionStatus::Rejected(e) => assert_eq!(e.status(), Some(401)),
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(validator.validate_tokens(Some(pair("stale", "r"))).await.is_none());
    }

    #[tokio::test]
    async fn unreachable_identity_api() {
        let client = ApiClient::with_timeout("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let validator = SessionValidator::new(client);

        let status = validator.inspect_tokens(Some(pair("good", "r"))).await;
        assert!(matches!(status, SessionStatus::Unreachable(_)), "{status:?}");
    }
}
