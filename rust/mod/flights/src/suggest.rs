//! Destination suggestions for the search form.
//!
//! Two surfaces share [`SuggestionList`]:
//!
//! - `GET /signed-in/flight-prices/suggestions?q=` renders `<li>` entries for
//!   one query.
//! - `GET /signed-in/flight-prices/suggest` upgrades to a WebSocket. Each text
//!   frame is the current input value; values are debounced and each settled
//!   query is searched before the next one starts. When the backend rejects
//!   the session's token the feed sends one error frame and closes with
//!   [`SESSION_EXPIRED_CLOSE`]; the page reloads through the auth gate.

use std::time::Duration;

use auth::Session;
use axum::extract::ws::{close_code, CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Extension;
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use skyfare_client::{ApiClient, Destination};
use skyfare_core::{debounce, html, ServiceError};
use tokio::sync::mpsc;

use crate::FlightsState;

/// One suggestion, identified by its IATA code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    pub iata: String,
    pub airport: String,
    pub region_name: String,
    pub country_code: String,
}

/// Search results keyed by IATA code, in backend order, first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct SuggestionList(Vec<Suggestion>);

impl SuggestionList {
    pub fn from_destinations(destinations: Vec<Destination>) -> Self {
        let mut items: Vec<Suggestion> = Vec::with_capacity(destinations.len());
        for d in destinations {
            if items.iter().any(|s| s.iata == d.iata) {
                continue;
            }
            items.push(Suggestion {
                iata: d.iata,
                airport: d.airport,
                region_name: d.region_name,
                country_code: d.country_code,
            });
        }
        Self(items)
    }

    pub fn get(&self, iata: &str) -> Option<&Suggestion> {
        self.0.iter().find(|s| s.iata == iata)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_html(&self) -> String {
        self.0
            .iter()
            .map(|s| {
                format!(
                    r#"<li data-iata="{}" data-airport="{}">{} ({}), {}</li>"#,
                    html::escape(&s.iata),
                    html::escape(&s.airport),
                    html::escape(&s.airport),
                    html::escape(&s.iata),
                    html::escape(&s.region_name),
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Search destinations for `query`. Blank queries yield no suggestions
/// without a backend call.
pub async fn search(client: &ApiClient, session: &Session, query: &str) -> Result<SuggestionList, ServiceError> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(SuggestionList::default());
    }
    let found = client.search_destinations(session, query).await?;
    Ok(SuggestionList::from_destinations(found))
}

/// Session from the gate, or validated here when the router runs ungated.
async fn resolve_session(
    st: &FlightsState,
    gated: Option<Extension<Session>>,
    jar: CookieJar,
) -> Result<Session, ServiceError> {
    if let Some(Extension(session)) = gated {
        return Ok(session);
    }
    st.auth
        .validator
        .validate(&st.auth.token_store(jar))
        .await
        .ok_or_else(|| ServiceError::Unauthorized(auth::UNAUTHORIZED.into()))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
}

/// GET /signed-in/flight-prices/suggestions?q=
pub async fn suggestions_fragment(
    State(st): State<FlightsState>,
    session: Option<Extension<Session>>,
    jar: CookieJar,
    Query(params): Query<SuggestParams>,
) -> Result<Html<String>, ServiceError> {
    let session = resolve_session(&st, session, jar).await?;
    let list = search(&st.auth.client, &session, &params.q).await?;
    Ok(Html(list.to_html()))
}

/// GET /signed-in/flight-prices/suggest (WebSocket)
pub async fn suggest_feed(
    State(st): State<FlightsState>,
    session: Option<Extension<Session>>,
    jar: CookieJar,
    ws: WebSocketUpgrade,
) -> Response {
    let session = match resolve_session(&st, session, jar).await {
        Ok(session) => session,
        Err(e) => return e.into_response(),
    };
    let client = st.auth.client.clone();
    let delay = st.suggest_delay;
    ws.on_upgrade(move |socket| run_feed(socket, client, session, delay))
}

/// Close code sent when the feed's session token is no longer accepted.
pub const SESSION_EXPIRED_CLOSE: u16 = close_code::POLICY;

/// The token held by the feed was rejected; the socket must not retry with it.
fn session_expired(e: &ServiceError) -> bool {
    matches!(e, ServiceError::Unauthorized(_) | ServiceError::Upstream { status: 401, .. })
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FeedFrame<'a> {
    query: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    suggestions: Option<SuggestionList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn run_feed(mut socket: WebSocket, client: ApiClient, session: Session, delay: Duration) {
    let (typed, rx) = mpsc::channel::<String>(32);
    let mut settled = debounce(rx, delay);
    tracing::debug!(user = %session.user.id, "suggestion feed opened");

    loop {
        tokio::select! {
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if typed.send(text.as_str().to_string()).await.is_err() {
                        break;
                    }
                }
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
            Some(query) = settled.recv() => {
                let mut expired = false;
                let frame = match search(&client, &session, &query).await {
                    Ok(list) => FeedFrame { query: &query, suggestions: Some(list), error: None },
                    Err(e) => {
                        expired = session_expired(&e);
                        FeedFrame { query: &query, suggestions: None, error: Some(e.public_message()) }
                    }
                };
                let Ok(payload) = serde_json::to_string(&frame) else {
                    continue;
                };
                if socket.send(Message::Text(payload.into())).await.is_err() {
                    break;
                }
                if expired {
                    tracing::info!(user = %session.user.id, "suggestion feed token rejected, closing");
                    let close = CloseFrame {
                        code: SESSION_EXPIRED_CLOSE,
                        reason: Utf8Bytes::from_static("session expired"),
                    };
                    socket.send(Message::Close(Some(close))).await.ok();
                    break;
                }
            }
        }
    }
    tracing::debug!(user = %session.user.id, "suggestion feed closed");
}
