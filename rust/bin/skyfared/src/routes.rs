//! Route registration: pages, system endpoints and module actions.

use std::sync::Arc;

use auth::{AuthContext, Session};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::{Extension, Router};
use axum_extra::extract::cookie::CookieJar;
use skyfare_client::User;
use skyfare_core::RenderCache;

use crate::config::ServerConfig;
use crate::gate::{gate_middleware, Gate};
use crate::pages;

/// Application shared state.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthContext,
    pub cache: Arc<RenderCache>,
    pub config: Arc<ServerConfig>,
}

/// Build the complete router.
///
/// Module actions are nested under `/actions/{name}`; `page_routes` are
/// merged as is. The gate wraps everything, so it sees every request
/// before any handler does.
pub fn build_router(
    state: AppState,
    module_routes: Vec<(&str, Router)>,
    page_routes: Vec<Router>,
) -> Router {
    let gate = Gate::standard(state.auth.clone(), &state.config.gate);
    let prefix = state.config.gate.protected_prefix.clone();

    let system_routes = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/assets/actions.js", get(actions_script));

    let mut app: Router<()> = Router::new()
        .route("/", get(landing_page))
        .route("/login", get(login_page))
        .route("/signup", get(signup_page))
        .route(&state.config.gate.unauthorized_path, get(unauthorized_page))
        .route(&state.config.gate.unreachable_path, get(unreachable_page))
        .route(&format!("{}/flight-prices", prefix), get(flight_prices_page))
        .route(&format!("{}/flight-informations", prefix), get(flight_informations_page))
        .fallback(not_found)
        .with_state(state);

    app = app.merge(system_routes);

    for (name, router) in module_routes {
        app = app.nest(&format!("/actions/{}", name), router);
    }
    for router in page_routes {
        app = app.merge(router);
    }

    app.layer(middleware::from_fn_with_state(gate, gate_middleware))
}

/// Serve a render from the cache, rendering and storing it on a miss.
fn cached_page(st: &AppState, path: &str, template: &str, user: Option<&User>) -> Html<String> {
    let variant = user.map(|u| u.id.as_str()).unwrap_or_default();
    if let Some(html) = st.cache.get(path, variant) {
        return Html(html);
    }
    let html = pages::render(template, user);
    st.cache.set(path, variant, html.clone());
    Html(html)
}

async fn landing_page(State(st): State<AppState>, jar: CookieJar) -> Html<String> {
    let session = st.auth.validator.validate(&st.auth.token_store(jar)).await;
    cached_page(&st, "/", pages::LANDING, session.as_ref().map(|s| &s.user))
}

async fn login_page() -> Html<String> {
    Html(pages::render(pages::LOGIN, None))
}

async fn signup_page() -> Html<String> {
    Html(pages::render(pages::SIGNUP, None))
}

async fn unauthorized_page() -> Response {
    (StatusCode::UNAUTHORIZED, Html(pages::render(pages::UNAUTHORIZED, None))).into_response()
}

async fn unreachable_page() -> Response {
    (StatusCode::SERVICE_UNAVAILABLE, Html(pages::render(pages::UNREACHABLE, None))).into_response()
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(pages::render(pages::NOT_FOUND, None))).into_response()
}

/// Render a page behind the gate. The gate has already placed the session
/// in the request; without one the visitor is sent to the sign-in notice.
fn signed_in_page(st: &AppState, path: &str, template: &str, session: Option<Extension<Session>>) -> Response {
    match session {
        Some(Extension(session)) => cached_page(st, path, template, Some(&session.user)).into_response(),
        None => Redirect::to(&st.config.gate.unauthorized_path).into_response(),
    }
}

async fn flight_prices_page(State(st): State<AppState>, session: Option<Extension<Session>>) -> Response {
    let path = format!("{}/flight-prices", st.config.gate.protected_prefix);
    signed_in_page(&st, &path, pages::FLIGHT_PRICES, session)
}

async fn flight_informations_page(State(st): State<AppState>, session: Option<Extension<Session>>) -> Response {
    let path = format!("{}/flight-informations", st.config.gate.protected_prefix);
    signed_in_page(&st, &path, pages::FLIGHT_INFORMATIONS, session)
}

async fn actions_script() -> impl IntoResponse {
    ([(CONTENT_TYPE, "text/javascript; charset=utf-8")], pages::ACTIONS_SCRIPT)
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "skyfared",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
