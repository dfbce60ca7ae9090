//! Startup checks.

use crate::config::ServerConfig;

/// Refuse to start with a configuration that cannot work.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    let base = &config.api.base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        anyhow::bail!("api.base_url must be an http(s) URL, got {:?}", base);
    }
    if config.api.timeout_secs == 0 {
        anyhow::bail!("api.timeout_secs must be greater than zero.");
    }

    let gate = &config.gate;
    for (name, path) in [
        ("gate.protected_prefix", &gate.protected_prefix),
        ("gate.unauthorized_path", &gate.unauthorized_path),
        ("gate.unreachable_path", &gate.unreachable_path),
    ] {
        if !path.starts_with('/') {
            anyhow::bail!("{} must start with '/', got {:?}", name, path);
        }
    }
    if gate.protected_prefix == "/" {
        anyhow::bail!("gate.protected_prefix cannot be '/': the error pages would be unreachable.");
    }
    for path in [&gate.unauthorized_path, &gate.unreachable_path] {
        if crate::gate::is_protected(path, &gate.protected_prefix) {
            anyhow::bail!("{} lies under the protected prefix {}.", path, gate.protected_prefix);
        }
    }

    if !config.cookies.secure && base.starts_with("https://") {
        tracing::warn!("cookies.secure is off while the API is served over HTTPS");
    }
    Ok(())
}
