pub mod cache;
pub mod debounce;
pub mod error;
pub mod html;
pub mod module;

pub use cache::{NoRevalidate, RenderCache, Revalidate};
pub use debounce::debounce;
pub use error::{ServiceError, DEFAULT_SERVER_ERROR_MESSAGE, UNAVAILABLE_MESSAGE};
pub use module::Module;
