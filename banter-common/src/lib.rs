//! # Piraeus Banter Common Library
//!
//! Shared code for the Piraeus Banter backend:
//! - Error types
//! - Configuration value object and its layered resolution

pub mod config;
pub mod error;

pub use config::ServerConfig;
pub use error::{Error, Result};
