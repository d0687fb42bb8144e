//! Core utilities, configuration, errors, and the web server

pub mod config;
pub mod error;
pub mod logging;
pub mod web_server;

// Re-exports for convenience
pub use config::ServerConfig;
pub use error::{AppError, AppResult};
pub use logging::{init_logger, log_startup_configuration};
pub use web_server::{build_router, start_web_server};
