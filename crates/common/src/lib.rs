//! Common types for the OAuth token relay

mod error;
mod secret;

pub use error::{Error, Result};
pub use secret::Secret;
