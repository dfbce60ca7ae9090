//! Token refresh.

use skyfare_core::ServiceError;

use crate::context::AuthState;
use crate::session::Session;
use crate::store::TokenStore;

/// Request header carrying the path of the page being served.
pub const CURRENT_PATH_HEADER: &str = "x-current-path";

/// Trade the session's refresh token for a new pair.
///
/// Both stored tokens are replaced and cached renders of `path` are evicted.
/// Failures propagate unchanged; nothing is retried.
pub async fn refresh(
    state: &AuthState,
    store: &mut TokenStore,
    session: &Session,
    path: Option<&str>,
) -> Result<Session, ServiceError> {
    let pair = state
        .client
        .refresh_token(session, &session.refresh_token)
        .await?;
    store.set(&pair);

    if let Some(path) = path {
        state.revalidate(path);
    }
    tracing::info!(user = %session.user.id, "session tokens refreshed");

    Ok(Session {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        user: session.user.clone(),
    })
}
