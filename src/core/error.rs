use crate::download::error::DownloadError;
use thiserror::Error;

/// Centralized error types for the application
///
/// Handlers turn `Validation` into a client error and everything else into a
/// server error carrying the display message.
///
/// # Example
///
/// ```no_run
/// use mediagrab::core::error::AppError;
///
/// fn handle_error(err: AppError) {
///     eprintln!("Error: {}", err);
/// }
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// Required input missing or malformed
    #[error("{0}")]
    Validation(String),

    /// Extractor failures (extraction, missing output)
    #[error("{0}")]
    Download(#[from] DownloadError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Whether the caller, not the server, is at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(self, AppError::Validation(_))
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;
