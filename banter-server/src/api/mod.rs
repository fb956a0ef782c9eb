//! HTTP API handlers for banter-server

pub mod export;
pub mod generate;
pub mod health;

pub use export::export_audio;
pub use generate::generate_audio;
pub use health::{health_routes, root_status};
