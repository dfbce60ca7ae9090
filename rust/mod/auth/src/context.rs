use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;
use skyfare_client::ApiClient;
use skyfare_core::{NoRevalidate, Revalidate};

use crate::session::SessionValidator;
use crate::store::TokenStore;

/// Shared state for every session-aware handler.
pub struct AuthState {
    pub client: ApiClient,
    pub validator: SessionValidator,
    pub revalidator: Arc<dyn Revalidate>,
    pub secure_cookies: bool,
}

pub type AuthContext = Arc<AuthState>;

impl AuthState {
    pub fn new(client: ApiClient, revalidator: Arc<dyn Revalidate>) -> Self {
        Self {
            validator: SessionValidator::new(client.clone()),
            client,
            revalidator,
            secure_cookies: false,
        }
    }

    /// State with no render cache behind it.
    pub fn without_cache(client: ApiClient) -> Self {
        Self::new(client, Arc::new(NoRevalidate))
    }

    pub fn secure_cookies(mut self, secure: bool) -> Self {
        self.secure_cookies = secure;
        self
    }

    /// Token store over this request's cookies.
    pub fn token_store(&self, jar: CookieJar) -> TokenStore {
        TokenStore::from_jar(jar).secure(self.secure_cookies)
    }

    pub fn revalidate(&self, path: &str) {
        self.revalidator.revalidate_path(path);
    }
}
