//! Mock implementations for integration testing
//!
//! This module provides a scripted `MediaExtractor` so the handlers and the
//! download pipeline can be exercised without yt-dlp or network access.

pub mod mock_extractor;

pub use mock_extractor::{MockBehavior, MockExtractor};
