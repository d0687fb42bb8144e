//! mediagrab - small web front-end for listing and downloading media formats
//!
//! Paste a video URL, get the downloadable video and audio formats, pick one
//! and receive the file. All extraction, downloading and transcoding is done
//! by yt-dlp; this crate classifies formats and serves the HTTP surface.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, and the web server
//! - `download`: extractor abstraction, format classification, download pipeline

pub mod cli;
pub mod core;
pub mod download;

// Re-export commonly used types for convenience
pub use crate::core::{config, AppError, AppResult, ServerConfig};
pub use crate::download::{MediaExtractor, VideoInfoSummary, YtDlpExtractor};
