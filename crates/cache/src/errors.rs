//! Error handling for the cache system
//!
//! Errors carry a recovery hint so callers holding a `Result` can decide
//! whether to retry, clear the cache, or give up.

mod conversions;
mod display;
mod recovery;
mod types;

pub use types::*;
