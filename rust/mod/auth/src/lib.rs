//! Auth module: cookie-backed sessions and the action layer.
//!
//! # Components
//!
//! - **TokenStore**: access/refresh tokens as HTTP-only cookies
//! - **SessionValidator**: checks stored tokens against the identity API
//! - **refresh**: trades the refresh token for a new pair
//! - **Action layer**: `unauth_action` / `auth_action` wrappers returning
//!   structured `ActionResult`s
//!
//! # Usage
//!
//! ```ignore
//! use auth::{AuthModule, AuthState};
//!
//! let state = Arc::new(AuthState::new(client, cache).secure_cookies(true));
//! let module = AuthModule::new(state);
//! let router = module.routes(); // Nested under /actions/auth
//! ```

pub mod action;
pub mod actions;
pub mod api;
pub mod context;
pub mod refresh;
pub mod schema;
pub mod session;
pub mod store;

use axum::Router;
use skyfare_core::Module;

pub use action::{auth_action, unauth_action, ActionInput, ActionPhase, ActionResult, UNAUTHORIZED};
pub use context::{AuthContext, AuthState};
pub use refresh::{refresh, CURRENT_PATH_HEADER};
pub use session::{Session, SessionStatus, SessionValidator};
pub use store::TokenStore;

/// Auth module implementing the Module trait.
pub struct AuthModule {
    ctx: AuthContext,
}

impl AuthModule {
    pub fn new(ctx: AuthContext) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &AuthContext {
        &self.ctx
    }
}

impl Module for AuthModule {
    fn name(&self) -> &str {
        "auth"
    }

    fn routes(&self) -> Router {
        api::build_router(self.ctx.clone())
    }
}
