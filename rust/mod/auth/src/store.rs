//! Cookie-backed token storage.

use std::convert::Infallible;

use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use skyfare_client::TokenPair;

pub const ACCESS_TOKEN: &str = "access_token";
pub const REFRESH_TOKEN: &str = "refresh_token";

/// The two session tokens as HTTP-only cookies.
///
/// Built from the request's cookie jar; changes made with [`set`](Self::set)
/// and [`delete`](Self::delete) reach the browser when the store is returned
/// as part of the response. Reads see changes made earlier in the same
/// request.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    jar: CookieJar,
    secure: bool,
}

impl TokenStore {
    pub fn from_jar(jar: CookieJar) -> Self {
        Self { jar, secure: false }
    }

    /// Mark written cookies `Secure`.
    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Stored value for `key`, if any.
    pub fn get(&self, key: &str) -> Option<String> {
        self.jar.get(key).map(|c| c.value().to_string())
    }

    /// Both tokens, or None when either is absent or empty.
    pub fn tokens(&self) -> Option<TokenPair> {
        let access_token = self.get(ACCESS_TOKEN).filter(|t| !t.is_empty())?;
        let refresh_token = self.get(REFRESH_TOKEN).filter(|t| !t.is_empty())?;
        Some(TokenPair { access_token, refresh_token })
    }

    /// Overwrite both tokens.
    pub fn set(&mut self, tokens: &TokenPair) {
        let jar = std::mem::take(&mut self.jar)
            .add(self.cookie(ACCESS_TOKEN, tokens.access_token.clone()))
            .add(self.cookie(REFRESH_TOKEN, tokens.refresh_token.clone()));
        self.jar = jar;
    }

    /// Remove both tokens.
    pub fn delete(&mut self) {
        let jar = std::mem::take(&mut self.jar)
            .remove(Cookie::build(ACCESS_TOKEN).path("/"))
            .remove(Cookie::build(REFRESH_TOKEN).path("/"));
        self.jar = jar;
    }

    pub fn into_jar(self) -> CookieJar {
        self.jar
    }

    fn cookie(&self, name: &'static str, value: String) -> Cookie<'static> {
        Cookie::build((name, value))
            .path("/")
            .http_only(true)
            .secure(self.secure)
            .build()
    }
}

impl IntoResponseParts for TokenStore {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        self.jar.into_response_parts(res)
    }
}
