//! `skyfared`: the Skyfare web front-end.
//!
//! Usage:
//!   skyfared [-c <context-name-or-path>] [--listen <addr>] [--api-url <url>]
//!
//! The context name resolves to `/etc/skyfare/<name>.toml`.
//! If a path with `/` or `.` is given, it's used directly. Without `-c`
//! the built-in defaults are used.

mod bootstrap;
mod config;
mod gate;
mod pages;
mod routes;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use skyfare_core::{Module, RenderCache};
use tracing::info;

use config::ServerConfig;
use routes::AppState;

/// Skyfare web front-end.
#[derive(Parser, Debug)]
#[command(name = "skyfared", about = "Skyfare web front-end")]
struct Cli {
    /// Context name or path to config file.
    #[arg(short = 'c', long = "config")]
    config: Option<String>,

    /// Listen address.
    #[arg(long = "listen", default_value = "0.0.0.0:8080")]
    listen: String,

    /// Backend API base URL (overrides api.base_url).
    #[arg(long = "api-url", env = "SKYFARE_API_URL")]
    api_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let mut server_config = match &cli.config {
        Some(name) => {
            let config_path = ServerConfig::resolve_path(name);
            info!("Loading configuration from {}", config_path.display());
            ServerConfig::load(&config_path)?
        }
        None => {
            info!("No configuration given, using defaults");
            ServerConfig::default()
        }
    };
    if let Some(url) = cli.api_url {
        server_config.api.base_url = url;
    }

    // Verify configuration is valid.
    bootstrap::verify_config(&server_config)?;

    let client = skyfare_client::ApiClient::with_timeout(
        &server_config.api.base_url,
        Duration::from_secs(server_config.api.timeout_secs),
    )?;
    info!("Backend API at {}", client.base_url());

    let cache = Arc::new(RenderCache::new(Duration::from_secs(server_config.cache.ttl_secs)));
    let auth_ctx: auth::AuthContext = Arc::new(
        auth::AuthState::new(client, cache.clone()).secure_cookies(server_config.cookies.secure),
    );

    let auth_module = auth::AuthModule::new(auth_ctx.clone());
    let flights_module = flights::FlightsModule::new(
        auth_ctx.clone(),
        Duration::from_millis(server_config.suggest.debounce_ms),
    );
    info!("Modules initialized");

    let module_routes = vec![
        (auth_module.name(), auth_module.routes()),
        (flights_module.name(), flights_module.routes()),
    ];
    let page_routes = vec![flights_module.page_routes()];

    let app_state = AppState {
        auth: auth_ctx,
        cache,
        config: Arc::new(server_config),
    };

    // Build router.
    let app = routes::build_router(app_state, module_routes, page_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!("Skyfare front-end listening on {}", cli.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
