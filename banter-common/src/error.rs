//! Common error types for Piraeus Banter

use thiserror::Error;

/// Common result type for banter operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the backend crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
