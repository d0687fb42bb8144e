//! Mock extractor
//!
//! Returns canned metadata, optionally writes the post-processed file where
//! yt-dlp would have left it, and records every call for later assertions.

#![allow(dead_code)]

use async_trait::async_trait;
use mediagrab::core::error::AppError;
use mediagrab::download::{DownloadError, DownloadRequest, ExtractedInfo, FormatRecord, MediaExtractor};
use std::sync::Mutex;

/// How the mock answers a download call
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Report success and write the output file
    Succeed,
    /// Fail every call with this extraction message
    FailExtraction(String),
    /// Report success without writing anything
    SkipOutput,
}

pub struct MockExtractor {
    info: ExtractedInfo,
    behavior: MockBehavior,
    file_contents: Vec<u8>,
    info_calls: Mutex<Vec<String>>,
    download_calls: Mutex<Vec<DownloadRequest>>,
}

impl MockExtractor {
    pub fn new(info: ExtractedInfo, behavior: MockBehavior) -> Self {
        Self {
            info,
            behavior,
            file_contents: b"fake media bytes".to_vec(),
            info_calls: Mutex::new(Vec::new()),
            download_calls: Mutex::new(Vec::new()),
        }
    }

    /// Metadata for a typical video with a handful of formats
    pub fn sample_info() -> ExtractedInfo {
        ExtractedInfo {
            title: Some("Sample Clip".to_string()),
            thumbnail: Some("https://i.example.com/sample.jpg".to_string()),
            duration: Some(125.4),
            ext: None,
            filename: None,
            internal_filename: None,
            formats: vec![
                record("18", "mp4", "avc1", "mp4a", Some(360), None, Some(1_048_576)),
                record("137", "mp4", "avc1", "none", Some(1080), None, None),
                record("248", "webm", "vp9", "none", Some(1080), None, Some(10 * 1_048_576)),
                record("398", "mp4", "av01", "none", Some(720), None, None),
                record("sb0", "mhtml", "none", "none", Some(45), None, None),
                record("139", "m4a", "none", "mp4a", None, Some(48.8), None),
                record("140", "m4a", "none", "mp4a", None, Some(129.5), Some(2 * 1_048_576)),
                record("251", "webm", "none", "opus", None, Some(256.0), None),
            ],
        }
    }

    pub fn failing(message: &str) -> Self {
        Self::new(ExtractedInfo::default(), MockBehavior::FailExtraction(message.to_string()))
    }

    pub fn info_calls(&self) -> Vec<String> {
        self.info_calls.lock().unwrap().clone()
    }

    pub fn download_calls(&self) -> Vec<DownloadRequest> {
        self.download_calls.lock().unwrap().clone()
    }

    pub fn file_contents(&self) -> &[u8] {
        &self.file_contents
    }
}

pub fn record(
    id: &str,
    ext: &str,
    vcodec: &str,
    acodec: &str,
    height: Option<u32>,
    abr: Option<f64>,
    filesize: Option<u64>,
) -> FormatRecord {
    FormatRecord {
        format_id: id.to_string(),
        ext: ext.to_string(),
        vcodec: Some(vcodec.to_string()),
        acodec: Some(acodec.to_string()),
        height,
        abr,
        filesize,
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn extract_info(&self, url: &str) -> Result<ExtractedInfo, AppError> {
        self.info_calls.lock().unwrap().push(url.to_string());

        match &self.behavior {
            MockBehavior::FailExtraction(message) => Err(DownloadError::Extraction(message.clone()).into()),
            _ => Ok(self.info.clone()),
        }
    }

    async fn download(&self, request: &DownloadRequest) -> Result<ExtractedInfo, AppError> {
        self.download_calls.lock().unwrap().push(request.clone());

        let title = self.info.title.clone().unwrap_or_else(|| "NA".to_string());
        // yt-dlp reports the pre-merge filename with the native extension
        let prepared = request.output_dir.join(format!("{}.webm", title));

        match &self.behavior {
            MockBehavior::FailExtraction(message) => return Err(DownloadError::Extraction(message.clone()).into()),
            MockBehavior::Succeed => {
                let final_path = prepared.with_extension(request.kind.target_extension());
                std::fs::write(&final_path, &self.file_contents)?;
            }
            MockBehavior::SkipOutput => {}
        }

        Ok(ExtractedInfo {
            title: Some(title),
            ext: Some("webm".to_string()),
            filename: Some(prepared.to_string_lossy().into_owned()),
            ..Default::default()
        })
    }
}
