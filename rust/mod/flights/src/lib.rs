//! Flights module: flight price search, price prediction and destination
//! suggestions.
//!
//! All actions require a session and forward validated input to the backend
//! API through the shared client.

pub mod api;
pub mod predict;
pub mod prices;
pub mod schema;
pub mod suggest;

use std::time::Duration;

use auth::AuthContext;
use axum::Router;
use skyfare_core::Module;

/// State shared by the flight handlers.
#[derive(Clone)]
pub struct FlightsState {
    pub auth: AuthContext,
    /// Pause the suggestion feed waits for before searching.
    pub suggest_delay: Duration,
}

pub struct FlightsModule {
    state: FlightsState,
}

impl FlightsModule {
    pub fn new(auth: AuthContext, suggest_delay: Duration) -> Self {
        Self {
            state: FlightsState { auth, suggest_delay },
        }
    }

    /// Routes served under the flight prices page rather than `/actions`.
    pub fn page_routes(&self) -> Router {
        api::page_routes(self.state.clone())
    }
}

impl Module for FlightsModule {
    fn name(&self) -> &str {
        "flights"
    }

    fn routes(&self) -> Router {
        api::build_router(self.state.clone())
    }
}
