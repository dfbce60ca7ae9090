//! Request gate: a chain of stages run in front of every route.
//!
//! Stages compose as a right fold. `Chain::run` hands the request to the
//! first stage together with a `Chain` over the remaining ones; a stage
//! either answers itself or calls `next.run(req)`. After the last stage the
//! wrapped router runs unchanged.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Request, State};
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use auth::{AuthContext, SessionStatus, CURRENT_PATH_HEADER};

use crate::config::GateConfig;

#[async_trait]
pub trait Stage: Send + Sync {
    async fn handle(&self, req: Request, next: Chain<'_>) -> Response;
}

/// The stages still to run, then the wrapped router.
pub struct Chain<'a> {
    stages: &'a [Arc<dyn Stage>],
    terminal: Next,
}

impl<'a> Chain<'a> {
    pub async fn run(self, req: Request) -> Response {
        match self.stages.split_first() {
            Some((stage, rest)) => {
                let next = Chain { stages: rest, terminal: self.terminal };
                stage.handle(req, next).await
            }
            None => self.terminal.run(req).await,
        }
    }
}

/// Ordered stages, applied with [`gate_middleware`].
#[derive(Clone)]
pub struct Gate {
    stages: Arc<Vec<Arc<dyn Stage>>>,
}

impl Gate {
    pub fn new(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self { stages: Arc::new(stages) }
    }

    /// Session check on the protected prefix, then current-path tagging.
    pub fn standard(auth: AuthContext, config: &GateConfig) -> Self {
        Self::new(vec![
            Arc::new(RequireSession::new(auth, config)),
            Arc::new(TagCurrentPath),
        ])
    }
}

pub async fn gate_middleware(State(gate): State<Gate>, req: Request, next: Next) -> Response {
    Chain { stages: &gate.stages, terminal: next }.run(req).await
}

/// True when `path` is `prefix` itself or lies below it.
pub fn is_protected(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

// ── Stages ──────────────────────────────────────────────────────────

/// Redirects visitors without a valid session away from the protected
/// area. Valid sessions are inserted into the request extensions.
pub struct RequireSession {
    auth: AuthContext,
    protected_prefix: String,
    unauthorized_path: String,
    unreachable_path: String,
}

impl RequireSession {
    pub fn new(auth: AuthContext, config: &GateConfig) -> Self {
        Self {
            auth,
            protected_prefix: config.protected_prefix.clone(),
            unauthorized_path: config.unauthorized_path.clone(),
            unreachable_path: config.unreachable_path.clone(),
        }
    }
}

#[async_trait]
impl Stage for RequireSession {
    async fn handle(&self, mut req: Request, next: Chain<'_>) -> Response {
        let path = req.uri().path().to_string();
        if !is_protected(&path, &self.protected_prefix) {
            return next.run(req).await;
        }

        let store = self.auth.token_store(CookieJar::from_headers(req.headers()));
        match self.auth.validator.inspect(&store).await {
            SessionStatus::Valid(session) => {
                req.extensions_mut().insert(session);
                next.run(req).await
            }
            SessionStatus::Unreachable(_) => {
                tracing::warn!(path = %path, "identity API unreachable, redirecting");
                Redirect::to(&self.unreachable_path).into_response()
            }
            SessionStatus::Missing | SessionStatus::Rejected(_) => {
                tracing::debug!(path = %path, "no session for protected path");
                Redirect::to(&self.unauthorized_path).into_response()
            }
        }
    }
}

/// Tags the request with `x-current-path` unless the caller already named
/// the page it is acting for.
pub struct TagCurrentPath;

#[async_trait]
impl Stage for TagCurrentPath {
    async fn handle(&self, mut req: Request, next: Chain<'_>) -> Response {
        if !req.headers().contains_key(CURRENT_PATH_HEADER) {
            if let Ok(value) = HeaderValue::from_str(req.uri().path()) {
                req.headers_mut().insert(CURRENT_PATH_HEADER, value);
            }
        }
        next.run(req).await
    }
}
