//! Server configuration.
//!
//! Loaded from `/etc/skyfare/<name>.toml`, or from a path when the argument
//! contains `/` or `.`. Every section and field has a default, so an empty
//! file (or no file at all) yields a working development setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub cookies: CookieConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub suggest: SuggestConfig,
}

/// Backend API connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Protected area and where rejected visitors are sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    #[serde(default = "default_protected_prefix")]
    pub protected_prefix: String,
    #[serde(default = "default_unauthorized_path")]
    pub unauthorized_path: String,
    #[serde(default = "default_unreachable_path")]
    pub unreachable_path: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            protected_prefix: default_protected_prefix(),
            unauthorized_path: default_unauthorized_path(),
            unreachable_path: default_unreachable_path(),
        }
    }
}

fn default_protected_prefix() -> String {
    "/signed-in".to_string()
}

fn default_unauthorized_path() -> String {
    "/errors/unauth".to_string()
}

fn default_unreachable_path() -> String {
    "/errors/not-ping".to_string()
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Mark session cookies `Secure`. Enable behind HTTPS.
    #[serde(default)]
    pub secure: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: default_ttl_secs() }
    }
}

fn default_ttl_secs() -> u64 {
    300
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for SuggestConfig {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

impl ServerConfig {
    /// Resolve a context name or path to a config file path.
    pub fn resolve_path(name_or_path: &str) -> PathBuf {
        if name_or_path.contains('/') || name_or_path.contains('.') {
            PathBuf::from(name_or_path)
        } else {
            PathBuf::from("/etc/skyfare").join(format!("{}.toml", name_or_path))
        }
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        let config: ServerConfig = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_context_name() {
        assert_eq!(
            ServerConfig::resolve_path("staging"),
            PathBuf::from("/etc/skyfare/staging.toml")
        );
        assert_eq!(
            ServerConfig::resolve_path("./dev.toml"),
            PathBuf::from("./dev.toml")
        );
    }

    #[test]
    fn empty_file_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.gate.protected_prefix, "/signed-in");
        assert_eq!(config.gate.unauthorized_path, "/errors/unauth");
        assert_eq!(config.cache.ttl_secs, 300);
        assert_eq!(config.suggest.debounce_ms, 300);
        assert!(!config.cookies.secure);
    }

    #[test]
    fn partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prod.toml");
        std::fs::write(
            &path,
            "[api]\nbase_url = \"https://api.skyfare.example/api/v1\"\n\n[cookies]\nsecure = true\n",
        )
        .unwrap();

        let config = ServerConfig::load(&path).unwrap();
        assert_eq!(config.api.base_url, "https://api.skyfare.example/api/v1");
        assert_eq!(config.api.timeout_secs, 30);
        assert!(config.cookies.secure);
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("roundtrip.toml");

        let mut config = ServerConfig::default();
        config.gate.protected_prefix = "/members".into();
        config.save(&path).unwrap();

        let loaded = ServerConfig::load(&path).unwrap();
        assert_eq!(loaded.gate.protected_prefix, "/members");
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = ServerConfig::load(Path::new("/nonexistent/skyfare.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/skyfare.toml"));
    }
}
