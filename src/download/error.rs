use std::fmt;

/// Structured error type for extractor-backed operations.
///
/// Every failure of the external extractor (network, unsupported site, bad URL,
/// blocked request, unparsable output) collapses into `Extraction`; only the
/// message tells them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadError {
    /// yt-dlp could not fetch metadata or media
    Extraction(String),
    /// yt-dlp reported success but the expected file is absent
    OutputMissing(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Extraction(msg) => write!(f, "{}", msg),
            DownloadError::OutputMissing(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

impl DownloadError {
    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Extraction(_) => "extraction",
            DownloadError::OutputMissing(_) => "output_missing",
        }
    }

    /// Returns the inner message
    pub fn message(&self) -> &str {
        match self {
            DownloadError::Extraction(msg) | DownloadError::OutputMissing(msg) => msg,
        }
    }
}

/// Plain strings are extractor failures
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        DownloadError::Extraction(s)
    }
}

impl From<&str> for DownloadError {
    fn from(s: &str) -> Self {
        DownloadError::Extraction(s.to_string())
    }
}
