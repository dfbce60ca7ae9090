use axum::Router;

/// A feature module that contributes action endpoints.
///
/// Each module (auth, flights) implements this trait to register its
/// actions. The server binary collects all modules and nests their
/// routes under `/actions/{name}`.
pub trait Module: Send + Sync {
    /// Module name, used for logging and route prefixes.
    fn name(&self) -> &str;

    /// Return the module's routes, to be nested under `/actions/{name}`.
    fn routes(&self) -> Router;
}
