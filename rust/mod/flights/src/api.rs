use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_extra::extract::cookie::CookieJar;
use auth::{ActionInput, ActionResult};
use skyfare_client::{Destination, FlightPriceResponse};

use crate::predict::{self, PredictResults};
use crate::{prices, suggest, FlightsState};

/// Flight action routes, nested by the caller under `/actions/flights`.
pub fn build_router(st: FlightsState) -> Router {
    Router::new()
        .route("/destinations", post(destinations))
        .route("/airlines", post(airlines))
        .route("/flight-prices", post(flight_prices))
        .route("/predict", post(predict_prices))
        .with_state(st)
}

/// Suggestion routes for the flight prices page, with absolute paths.
pub fn page_routes(st: FlightsState) -> Router {
    Router::new()
        .route("/signed-in/flight-prices/suggestions", get(suggest::suggestions_fragment))
        .route("/signed-in/flight-prices/suggest", get(suggest::suggest_feed))
        .with_state(st)
}

/// POST /actions/flights/destinations
async fn destinations(
    State(st): State<FlightsState>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<Vec<Destination>>> {
    let tokens = st.auth.token_store(jar).tokens();
    Json(prices::destinations(&st.auth, tokens, input).await)
}

/// POST /actions/flights/airlines
async fn airlines(
    State(st): State<FlightsState>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<Vec<String>>> {
    let tokens = st.auth.token_store(jar).tokens();
    Json(prices::airlines(&st.auth, tokens, input).await)
}

/// POST /actions/flights/flight-prices
async fn flight_prices(
    State(st): State<FlightsState>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<FlightPriceResponse>> {
    let tokens = st.auth.token_store(jar).tokens();
    Json(prices::flight_prices(&st.auth, tokens, input).await)
}

/// POST /actions/flights/predict
async fn predict_prices(
    State(st): State<FlightsState>,
    jar: CookieJar,
    ActionInput(input): ActionInput,
) -> Json<ActionResult<PredictResults>> {
    let tokens = st.auth.token_store(jar).tokens();
    Json(predict::predict(&st.auth, tokens, input).await)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::header::COOKIE;
    use axum::http::{Request, StatusCode};
    use auth::AuthState;
    use serde_json::{json, Value};
    use skyfare_client::testing::spawn_backend;
    use skyfare_client::ApiClient;
    use tower::ServiceExt;

    use super::*;

    async fn state() -> FlightsState {
        let backend = Router::new()
            .route("/auth/me", get(|| async { Json(json!({"id": "u1", "username": "alice"})) }))
            .route(
                "/flight-prices/destinations/search",
                get(|| async {
                    Json(json!([{
                        "country_code": "AU", "region_name": "Sydney", "iata": "SYD", "icao": "YSSY",
                        "airport": "Sydney Kingsford Smith", "latitude": -33.9461, "longitude": 151.177
                    }]))
                }),
            );
        let client = ApiClient::new(spawn_backend(backend).await);
        FlightsState {
            auth: Arc::new(AuthState::without_cache(client)),
            suggest_delay: Duration::from_millis(300),
        }
    }

    async fn send(router: Router, req: Request<Body>) -> (StatusCode, String) {
        let resp = router.oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn destinations_action_over_http() {
        let router = build_router(state().await);
        let req = Request::builder()
            .method("POST")
            .uri("/destinations")
            .header(COOKIE, "access_token=a; refresh_token=r")
            .body(Body::from(r#"{"q": "Syd"}"#))
            .unwrap();

        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["data"][0]["iata"], "SYD");
    }

    #[tokio::test]
    async fn action_without_cookies_is_unauthorized() {
        let router = build_router(state().await);
        let req = Request::builder()
            .method("POST")
            .uri("/airlines")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"serverError": "Unauthorized"}));
    }

    #[tokio::test]
    async fn suggestion_fragment_renders_list() {
        let router = page_routes(state().await);
        let req = Request::builder()
            .uri("/signed-in/flight-prices/suggestions?q=Syd")
            .header(COOKIE, "access_token=a; refresh_token=r")
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(router, req).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.starts_with(r#"<li data-iata="SYD""#), "{body}");
    }

    #[tokio::test]
    async fn suggestion_fragment_without_session() {
        let router = page_routes(state().await);
        let req = Request::builder()
            .uri("/signed-in/flight-prices/suggestions?q=Syd")
            .body(Body::empty())
            .unwrap();

        let (status, _) = send(router, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
