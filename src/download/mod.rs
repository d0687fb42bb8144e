//! Format listing and download management

pub mod error;
pub mod extractor;
pub mod formats;
pub mod pipeline;
pub mod ytdlp;

// Re-exports for convenience
pub use error::DownloadError;
pub use extractor::{DownloadRequest, ExtractedInfo, FormatKind, FormatRecord, MediaExtractor};
pub use formats::{FormatOption, FormatOptions, VideoInfoSummary};
pub use pipeline::{download_media, fetch_formats};
pub use ytdlp::YtDlpExtractor;
