//! HTTP request handlers.

mod diagnostics;
mod fallback;
mod generate;
mod health;
mod models;

pub use diagnostics::{check_keys, mask_key, smoke_test};
pub use fallback::{handle_panic, not_found};
pub use generate::{GenerationRequest, ValidationError, generate};
pub use health::health;
pub use models::list_models;
