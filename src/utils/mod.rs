// The `utils` module holds authentication and templating support.

pub mod context_hub;
pub mod google_auth;
pub mod template;

pub use crate::utils::template::{TEngine, TEngineError};
