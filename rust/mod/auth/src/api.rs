use axum::extract::State;
use axum::http::HeaderMap;
use axum::routing::post;
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use skyfare_client::User;

use crate::action::{ActionInput, ActionResult};
use crate::actions;
use crate::context::AuthContext;
use crate::refresh::CURRENT_PATH_HEADER;
use crate::store::TokenStore;

/// Auth action routes, relative to where the caller nests them.
pub fn build_router(ctx: AuthContext) -> Router {
    Router::new()
        .route("/sign-in", post(sign_in))
        .route("/sign-up", post(sign_up))
        .route("/logout", post(logout))
        .route("/user", post(get_user))
        .route("/update-user", post(update_user))
        .route("/refresh-token", post(refresh_token))
        .with_state(ctx)
}

/// POST /actions/auth/sign-in
async fn sign_in(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> (TokenStore, Json<ActionResult<User>>) {
    let mut store = ctx.token_store(jar);
    let result = actions::sign_in(&ctx, &mut store, input).await;
    (store, Json(result))
}

/// POST /actions/auth/sign-up
async fn sign_up(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> (TokenStore, Json<ActionResult<User>>) {
    let mut store = ctx.token_store(jar);
    let result = actions::sign_up(&ctx, &mut store, input).await;
    (store, Json(result))
}

/// POST /actions/auth/logout
async fn logout(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> (TokenStore, Json<ActionResult<()>>) {
    let mut store = ctx.token_store(jar);
    let result = actions::logout(&ctx, &mut store, input).await;
    (store, Json(result))
}

/// POST /actions/auth/user
async fn get_user(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<User>> {
    let store = ctx.token_store(jar);
    Json(actions::get_user(&ctx, &store, input).await)
}

/// POST /actions/auth/update-user
async fn update_user(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<User>> {
    let store = ctx.token_store(jar);
    Json(actions::update_user(&ctx, &store, input).await)
}

/// POST /actions/auth/refresh-token
async fn refresh_token(
    State(ctx): State<AuthContext>,
    jar: CookieJar,
    headers: HeaderMap,
    ActionInput(input): ActionInput,
) -> (TokenStore, Json<ActionResult<()>>) {
    let current_path = headers
        .get(CURRENT_PATH_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let mut store = ctx.token_store(jar);
    let result = actions::refresh_token(&ctx, &mut store, current_path, input).await;
    (store, Json(result))
}
