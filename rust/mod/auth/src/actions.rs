//! Session and profile actions.

use serde_json::Value;
use skyfare_client::{status_text, ApiError, User};
use skyfare_core::ServiceError;

use crate::action::{auth_action, unauth_action, ActionResult};
use crate::context::AuthState;
use crate::refresh::refresh;
use crate::schema::{NoInput, RefreshInput, SignInInput, SignUpInput, UserIdInput, UserUpdateInput};
use crate::store::TokenStore;

/// Where the browser goes after signing in or out.
pub const HOME: &str = "/";

/// Sign-in failures report only the HTTP status text.
fn sign_in_failure(e: ApiError) -> ServiceError {
    match e {
        ApiError::Server { status, .. } => ServiceError::Upstream { status, message: status_text(status) },
        other => other.into(),
    }
}

fn sign_up_failure(e: ApiError) -> ServiceError {
    match e {
        ApiError::Server { status, .. } => ServiceError::Upstream {
            status,
            message: "Failed to sign up".into(),
        },
        other => other.into(),
    }
}

pub async fn sign_in(state: &AuthState, store: &mut TokenStore, input: Value) -> ActionResult<User> {
    unauth_action("sign-in", input, move |creds: SignInInput| async move {
        let login = state.client.sign_in(&creds).await.map_err(sign_in_failure)?;
        store.set(&login.tokens());
        state.revalidate(HOME);
        tracing::info!(user = %login.user.id, "signed in");
        Ok::<_, ServiceError>(login.user)
    })
    .await
    .redirect_on_success(HOME)
}

pub async fn sign_up(state: &AuthState, store: &mut TokenStore, input: Value) -> ActionResult<User> {
    unauth_action("sign-up", input, move |profile: SignUpInput| async move {
        let login = state.client.sign_up(&profile).await.map_err(sign_up_failure)?;
        store.set(&login.tokens());
        state.revalidate(HOME);
        tracing::info!(user = %login.user.id, "signed up");
        Ok::<_, ServiceError>(login.user)
    })
    .await
    .redirect_on_success(HOME)
}

pub async fn logout(state: &AuthState, store: &mut TokenStore, input: Value) -> ActionResult<()> {
    let tokens = store.tokens();
    auth_action("logout", &state.validator, tokens, input, move |_: NoInput, session| async move {
        store.delete();
        state.revalidate(HOME);
        tracing::info!(user = %session.user.id, "signed out");
        Ok::<_, ServiceError>(())
    })
    .await
    .redirect_on_success(HOME)
}

/// The signed-in user's profile. The `id` input is accepted but the
/// session's own user id is what gets fetched.
pub async fn get_user(state: &AuthState, store: &TokenStore, input: Value) -> ActionResult<User> {
    auth_action("get-user", &state.validator, store.tokens(), input, move |_: UserIdInput, session| async move {
        let user = state.client.get_user(&session, &session.user.id).await?;
        Ok::<_, ServiceError>(user)
    })
    .await
}

pub async fn update_user(state: &AuthState, store: &TokenStore, input: Value) -> ActionResult<User> {
    auth_action("update-user", &state.validator, store.tokens(), input, move |patch: UserUpdateInput, session| async move {
        let user = state
            .client
            .update_user(&session, &session.user.id, &patch)
            .await?;
        state.revalidate(HOME);
        Ok::<_, ServiceError>(user)
    })
    .await
}

/// Refresh the token pair. `current_path` is the page that triggered the
/// refresh, used when the input names no path.
pub async fn refresh_token(
    state: &AuthState,
    store: &mut TokenStore,
    current_path: Option<String>,
    input: Value,
) -> ActionResult<()> {
    let tokens = store.tokens();
    auth_action("refresh-token", &state.validator, tokens, input, move |input: RefreshInput, session| async move {
        let path = input.path.or(current_path);
        refresh(state, store, &session, path.as_deref()).await?;
        Ok::<_, ServiceError>(())
    })
    .await
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::{get, post, put};
    use axum::{Json, Router};
    use serde_json::json;
    use skyfare_client::testing::spawn_backend;
    use skyfare_client::{ApiClient, TokenPair};
    use skyfare_core::RenderCache;

    use super::*;
    use crate::action::UNAUTHORIZED;
    use crate::store::{ACCESS_TOKEN, REFRESH_TOKEN};

    fn bearer(headers: &HeaderMap) -> Option<String> {
        headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::to_string)
    }

    /// Backend that knows alice/password123 and accepts access tokens `a`
    /// and `a2`.
    fn backend() -> Router {
        Router::new()
            .route(
                "/auth/signIn",
                post(|Json(body): Json<Value>| async move {
                    if body == json!({"username": "alice", "password": "password123"}) {
                        Ok(Json(json!({
                            "access_token": "a",
                            "refresh_token": "r",
                            "user": {"id": "u1", "username": "alice", "password": "hash"}
                        })))
                    } else {
                        Err((StatusCode::UNAUTHORIZED, Json(json!({"detail": "Invalid credentials"}))))
                    }
                }),
            )
            .route(
                "/auth/signUp",
                post(|| async { (StatusCode::CONFLICT, Json(json!({"detail": "Username taken"}))) }),
            )
            .route(
                "/auth/me",
                get(|headers: HeaderMap| async move {
                    match bearer(&headers).as_deref() {
                        Some("a") | Some("a2") => Ok(Json(json!({"id": "u1", "username": "alice"}))),
                        _ => Err(StatusCode::UNAUTHORIZED),
                    }
                }),
            )
            .route(
                "/auth/refreshToken",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["refreshToken"], "r");
                    Json(json!({"access_token": "a2", "refresh_token": "r2"}))
                }),
            )
            .route(
                "/user/{id}",
                put(|Json(patch): Json<Value>| async move {
                    Json(json!({"id": "u1", "username": patch["username"]}))
                }),
            )
    }

    async fn state_with_cache() -> (AuthState, Arc<RenderCache>) {
        let client = ApiClient::new(spawn_backend(backend()).await);
        let cache = Arc::new(RenderCache::new(Duration::from_secs(60)));
        (AuthState::new(client, cache.clone()), cache)
    }

    fn signed_in_store() -> TokenStore {
        let mut store = TokenStore::default();
        store.set(&TokenPair { access_token: "a".into(), refresh_token: "r".into() });
        store
    }

    #[tokio::test]
    async fn sign_in_sets_cookies_and_redirects_home() {
        let (state, cache) = state_with_cache().await;
        cache.set("/", "", "anonymous navbar".into());
        let mut store = TokenStore::default();

        let result = sign_in(
            &state,
            &mut store,
            json!({"username": "alice", "password": "password123"}),
        )
        .await;

        assert_eq!(result.redirect.as_deref(), Some("/"));
        assert_eq!(result.data.unwrap().username, "alice");
        assert_eq!(store.get(ACCESS_TOKEN).as_deref(), Some("a"));
        assert_eq!(store.get(REFRESH_TOKEN).as_deref(), Some("r"));
        assert!(cache.get("/", "").is_none());
    }

    #[tokio::test]
    async fn sign_in_failure_is_status_text() {
        let (state, _) = state_with_cache().await;
        let mut store = TokenStore::default();

        let result = sign_in(&state, &mut store, json!({"username": "alice", "password": "wrongpass"})).await;

        assert_eq!(result.server_error.as_deref(), Some("Unauthorized"));
        assert!(result.redirect.is_none());
        assert!(store.tokens().is_none());
    }

    #[tokio::test]
    async fn unreachable_backend_hides_its_address() {
        let client = ApiClient::with_timeout("http://127.0.0.1:9/internal-api/v1", Duration::from_secs(2)).unwrap();
        let state = AuthState::without_cache(client);
        let mut store = TokenStore::default();

        let result = sign_in(&state, &mut store, json!({"username": "alice", "password": "password123"})).await;

        let message = result.server_error.unwrap();
        assert_eq!(message, skyfare_core::UNAVAILABLE_MESSAGE);
        assert!(!message.contains("127.0.0.1"));
        assert!(!message.contains("internal-api"));
        assert!(result.redirect.is_none());
    }

    #[tokio::test]
    async fn sign_up_failure_is_generic() {
        let (state, _) = state_with_cache().await;
        let mut store = TokenStore::default();

        let result = sign_up(
            &state,
            &mut store,
            json!({
                "email": "alice@example.com",
                "password": "password123",
                "firstName": "Alice",
                "lastName": "Liddell",
                "username": "alice"
            }),
        )
        .await;

        assert_eq!(result.server_error.as_deref(), Some("Failed to sign up"));
    }

    #[tokio::test]
    async fn logout_requires_session() {
        let (state, _) = state_with_cache().await;
        let mut store = TokenStore::default();

        let result = logout(&state, &mut store, Value::Null).await;
        assert_eq!(result.server_error.as_deref(), Some(UNAUTHORIZED));
        assert!(result.redirect.is_none());
    }

    #[tokio::test]
    async fn logout_clears_cookies() {
        let (state, cache) = state_with_cache().await;
        cache.set("/", "u1", "alice navbar".into());
        let mut store = signed_in_store();

        let result = logout(&state, &mut store, Value::Null).await;

        assert_eq!(result.redirect.as_deref(), Some("/"));
        assert!(store.tokens().is_none());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn refresh_replaces_tokens_and_revalidates_current_path() {
        let (state, cache) = state_with_cache().await;
        cache.set("/signed-in/flight-prices", "u1", "prices".into());
        cache.set("/", "u1", "home".into());
        let mut store = signed_in_store();

        let result = refresh_token(
            &state,
            &mut store,
            Some("/signed-in/flight-prices".into()),
            Value::Null,
        )
        .await;

        assert!(result.is_success(), "{result:?}");
        assert_eq!(
            store.tokens(),
            Some(TokenPair { access_token: "a2".into(), refresh_token: "r2".into() })
        );
        assert!(cache.get("/signed-in/flight-prices", "u1").is_none());
        assert!(cache.get("/", "u1").is_some());
    }

    #[tokio::test]
    async fn update_user_uses_session_user() {
        let (state, _) = state_with_cache().await;
        let store = signed_in_store();

        let result = update_user(&state, &store, json!({"username": "alice2"})).await;
        assert_eq!(result.data.unwrap().username, "alice2");
    }

    #[tokio::test]
    async fn unauthorized_action_makes_no_backend_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().fallback(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                StatusCode::OK
            }
        });
        let state = AuthState::without_cache(ApiClient::new(spawn_backend(router).await));

        let result = get_user(&state, &TokenStore::default(), json!({"id": "u1"})).await;

        assert_eq!(result.server_error.as_deref(), Some(UNAUTHORIZED));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
