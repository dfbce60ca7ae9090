//! Page render cache and path revalidation.
//!
//! Pages that show session-dependent content are cached per
//! `(path, variant)`, where the variant is usually the user id (empty for
//! anonymous visitors). Actions that change what a page would show call
//! [`Revalidate::revalidate_path`], which drops every variant of that path.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Invalidate cached data for a request path.
pub trait Revalidate: Send + Sync + 'static {
    fn revalidate_path(&self, path: &str);
}

/// Revalidator that does nothing. Used when caching is disabled and in tests.
pub struct NoRevalidate;

impl Revalidate for NoRevalidate {
    fn revalidate_path(&self, _path: &str) {}
}

struct CacheEntry {
    html: String,
    inserted_at: Instant,
}

/// In-memory cache of rendered pages with TTL.
pub struct RenderCache {
    ttl: Duration,
    entries: RwLock<HashMap<String, HashMap<String, CacheEntry>>>,
}

impl RenderCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Get a cached render. Returns None if expired or missing.
    pub fn get(&self, path: &str, variant: &str) -> Option<String> {
        let entries = self.entries.read().ok()?;
        entries
            .get(path)
            .and_then(|variants| variants.get(variant))
            .filter(|entry| entry.inserted_at.elapsed() < self.ttl)
            .map(|entry| entry.html.clone())
    }

    /// Store a render. Expired renders of every path are dropped first.
    pub fn set(&self, path: &str, variant: &str, html: String) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        let ttl = self.ttl;
        entries.retain(|_, variants| {
            variants.retain(|_, entry| entry.inserted_at.elapsed() < ttl);
            !variants.is_empty()
        });
        entries.entry(path.to_string()).or_default().insert(
            variant.to_string(),
            CacheEntry {
                html,
                inserted_at: Instant::now(),
            },
        );
    }

    /// Number of cached renders across all paths.
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().map(HashMap::len).sum())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Revalidate for RenderCache {
    fn revalidate_path(&self, path: &str) {
        if let Ok(mut entries) = self.entries.write() {
            if let Some(dropped) = entries.remove(path) {
                tracing::debug!(path, renders = dropped.len(), "revalidated path");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let cache = RenderCache::new(Duration::from_secs(60));
        cache.set("/", "1", "<p>alice</p>".into());
        assert_eq!(cache.get("/", "1").as_deref(), Some("<p>alice</p>"));
        assert!(cache.get("/", "2").is_none());
        assert!(cache.get("/login", "1").is_none());
    }

    #[test]
    fn revalidate_drops_only_that_path() {
        let cache = RenderCache::new(Duration::from_secs(60));
        cache.set("/", "1", "home-alice".into());
        cache.set("/", "", "home-anon".into());
        cache.set("/signed-in/flight-prices", "1", "prices".into());
        assert_eq!(cache.len(), 3);

        cache.revalidate_path("/");

        assert!(cache.get("/", "1").is_none());
        assert!(cache.get("/", "").is_none());
        assert_eq!(cache.get("/signed-in/flight-prices", "1").as_deref(), Some("prices"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_are_misses() {
        let cache = RenderCache::new(Duration::ZERO);
        cache.set("/", "1", "stale".into());
        assert!(cache.get("/", "1").is_none());
    }

    #[test]
    fn set_drops_expired_renders() {
        let cache = RenderCache::new(Duration::from_millis(20));
        cache.set("/", "u1", "alice".into());
        cache.set("/signed-in/flight-prices", "u2", "bob".into());
        assert_eq!(cache.len(), 2);

        std::thread::sleep(Duration::from_millis(40));
        cache.set("/", "u3", "carol".into());

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("/", "u3").as_deref(), Some("carol"));
    }

    #[test]
    fn revalidating_unknown_path_is_noop() {
        let cache = RenderCache::new(Duration::from_secs(60));
        cache.revalidate_path("/nowhere");
        assert!(cache.is_empty());
    }
}
