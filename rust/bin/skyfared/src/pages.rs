//! HTML page rendering.
//!
//! Pages are static templates compiled into the binary. `{{key}}`
//! placeholders are filled with escaped text or with trusted markup.

use skyfare_client::User;
use skyfare_core::html;

pub const LANDING: &str = include_str!("web/index.html");
pub const LOGIN: &str = include_str!("web/login.html");
pub const SIGNUP: &str = include_str!("web/signup.html");
pub const UNAUTHORIZED: &str = include_str!("web/unauth.html");
pub const UNREACHABLE: &str = include_str!("web/not-ping.html");
pub const NOT_FOUND: &str = include_str!("web/not-found.html");
pub const FLIGHT_PRICES: &str = include_str!("web/flight-prices.html");
pub const FLIGHT_INFORMATIONS: &str = include_str!("web/flight-informations.html");

/// Client helper shared by the pages for calling actions.
pub const ACTIONS_SCRIPT: &str = include_str!("web/actions.js");

pub struct Template {
    out: String,
}

impl Template {
    pub fn new(source: &str) -> Self {
        Self { out: source.to_string() }
    }

    /// Replace `{{key}}` with escaped `value`.
    pub fn text(self, key: &str, value: &str) -> Self {
        self.raw(key, &html::escape(value))
    }

    /// Replace `{{key}}` with `markup` as is.
    pub fn raw(mut self, key: &str, markup: &str) -> Self {
        self.out = self.out.replace(&format!("{{{{{}}}}}", key), markup);
        self
    }

    pub fn finish(self) -> String {
        self.out
    }
}

/// Navigation bar for the signed-in user, or sign-in links.
pub fn navbar(user: Option<&User>) -> String {
    match user {
        Some(user) => format!(
            r#"<nav>
  <a href="/">Skyfare</a>
  <a href="/signed-in/flight-prices">Flight prices</a>
  <a href="/signed-in/flight-informations">Price prediction</a>
  <span class="user">Hi, {}</span>
  <button type="button" id="logout">Log out</button>
</nav>"#,
            html::escape(user.display_name())
        ),
        None => r#"<nav>
  <a href="/">Skyfare</a>
  <a href="/login">Log in</a>
  <a href="/signup">Sign up</a>
</nav>"#
            .to_string(),
    }
}

/// Render `template` with the shared navbar.
pub fn render(template: &str, user: Option<&User>) -> String {
    Template::new(template).raw("nav", &navbar(user)).finish()
}
