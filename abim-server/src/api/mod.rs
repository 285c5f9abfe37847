//! HTTP API handlers for abim-server.

pub mod auth;
pub mod health;
pub mod import;

pub use auth::token_middleware;
pub use health::health_routes;
pub use import::{import_file, import_row};
