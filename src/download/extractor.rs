//! Media extractor abstraction.
//!
//! Provides the `MediaExtractor` trait describing what the external
//! extraction/transcoding collaborator must offer: metadata-only extraction and
//! extraction+download with a format selector, output template and audio
//! post-processing. `YtDlpExtractor` (see `download::ytdlp`) is the production
//! backend; tests plug in their own.

use crate::core::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;

/// One downloadable stream variant as reported by the extractor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FormatRecord {
    /// Opaque token used later to request this exact stream
    #[serde(default, deserialize_with = "null_as_default")]
    pub format_id: String,
    /// Container extension (mp4, webm, m4a, ...)
    #[serde(default, deserialize_with = "null_as_default")]
    pub ext: String,
    /// Video codec, `"none"` when the stream carries no video
    pub vcodec: Option<String>,
    /// Audio codec, `"none"` when the stream carries no audio
    pub acodec: Option<String>,
    /// Vertical resolution in pixels
    #[serde(default, deserialize_with = "lenient_u32")]
    pub height: Option<u32>,
    /// Average audio bitrate in kbps
    #[serde(default, deserialize_with = "lenient_f64")]
    pub abr: Option<f64>,
    /// File size in bytes
    #[serde(default, deserialize_with = "lenient_u64")]
    pub filesize: Option<u64>,
}

impl FormatRecord {
    /// Video iff the video codec is anything but the `"none"` sentinel.
    pub fn has_video(&self) -> bool {
        self.vcodec.as_deref() != Some("none")
    }

    /// Audio iff the audio codec is anything but the `"none"` sentinel.
    pub fn has_audio(&self) -> bool {
        self.acodec.as_deref() != Some("none")
    }
}

/// Metadata returned by the extractor for a single URL.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ExtractedInfo {
    pub title: Option<String>,
    pub thumbnail: Option<String>,
    /// Duration in seconds, fractional for some sites
    #[serde(default, deserialize_with = "lenient_f64")]
    pub duration: Option<f64>,
    /// Native extension of the selected stream (download mode)
    pub ext: Option<String>,
    /// Path the extractor prepared for the selected stream (download mode)
    pub filename: Option<String>,
    #[serde(rename = "_filename")]
    pub internal_filename: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub formats: Vec<FormatRecord>,
}

impl ExtractedInfo {
    /// Path yt-dlp prepared for the download, before post-processing.
    pub fn prepared_filename(&self) -> Option<&str> {
        self.filename.as_deref().or(self.internal_filename.as_deref())
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Extractors emit numbers as ints, floats or occasionally strings depending on
// the site. A value that is not a usable number becomes `None` for that field
// only, so one odd record never fails the whole document.

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Value::as_f64).filter(|n| n.is_finite()))
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u64))
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_u64).and_then(|n| u32::try_from(n).ok()))
}

/// Non-negative integer, truncating floats like `1048576.0`
fn value_as_u64(value: &Value) -> Option<u64> {
    let Value::Number(number) = value else {
        return None;
    };
    number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n.trunc() as u64)
    })
}

/// What the user asked for in the download form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatKind {
    /// Extract and transcode the audio track
    AudioOnly,
    /// Merge the chosen video stream with the best audio
    Video,
}

impl FormatKind {
    /// `"mp3"` selects audio-only; any other value means video.
    pub fn from_form_value(value: &str) -> Self {
        if value == "mp3" {
            FormatKind::AudioOnly
        } else {
            FormatKind::Video
        }
    }

    /// Extension of the file the post-processor leaves behind.
    pub fn target_extension(self) -> &'static str {
        match self {
            FormatKind::AudioOnly => crate::core::config::download::AUDIO_CODEC,
            FormatKind::Video => crate::core::config::download::MERGE_CONTAINER,
        }
    }
}

/// Request parameters for a download operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    /// Page URL handed to the extractor
    pub url: String,
    /// Audio-only transcode or video merge
    pub kind: FormatKind,
    /// Identifier previously returned by the list-formats operation
    pub format_id: String,
    /// Directory the output template is rooted at
    pub output_dir: PathBuf,
}

/// Contract for the external extraction/transcoding collaborator.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Human-readable name of this backend (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Fetch metadata and the format list without downloading any media.
    async fn extract_info(&self, url: &str) -> Result<ExtractedInfo, AppError>;

    /// Download (and post-process) the requested format, returning the
    /// metadata of what was retrieved.
    async fn download(&self, request: &DownloadRequest) -> Result<ExtractedInfo, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_kind_from_form_value() {
        assert_eq!(FormatKind::from_form_value("mp3"), FormatKind::AudioOnly);
        assert_eq!(FormatKind::from_form_value("mp4"), FormatKind::Video);
        assert_eq!(FormatKind::from_form_value("video"), FormatKind::Video);
        assert_eq!(FormatKind::from_form_value("MP3"), FormatKind::Video);
    }

    #[test]
    fn test_target_extension() {
        assert_eq!(FormatKind::AudioOnly.target_extension(), "mp3");
        assert_eq!(FormatKind::Video.target_extension(), "mp4");
    }

    #[test]
    fn test_codec_sentinels() {
        let video_only = FormatRecord {
            vcodec: Some("avc1.640028".into()),
            acodec: Some("none".into()),
            ..Default::default()
        };
        assert!(video_only.has_video());
        assert!(!video_only.has_audio());

        // Missing codec fields are not the sentinel
        let unknown = FormatRecord::default();
        assert!(unknown.has_video());
        assert!(unknown.has_audio());
    }

    #[test]
    fn test_extracted_info_deserializes_ytdlp_json() {
        let json = r#"{
            "title": "Song",
            "thumbnail": "https://i.ytimg.com/vi/x/hq.jpg",
            "duration": 212.5,
            "ext": "webm",
            "_filename": "downloads/Song.webm",
            "filename": "downloads/Song.webm",
            "formats": [
                {"format_id": "251", "ext": "webm", "vcodec": "none", "acodec": "opus", "abr": 129.478, "filesize": 3456789},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none", "height": 1080, "filesize": null}
            ]
        }"#;
        let info: ExtractedInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.title.as_deref(), Some("Song"));
        assert_eq!(info.prepared_filename(), Some("downloads/Song.webm"));
        assert_eq!(info.formats.len(), 2);
        assert_eq!(info.formats[0].abr, Some(129.478));
        assert_eq!(info.formats[1].height, Some(1080));
        assert_eq!(info.formats[1].filesize, None);
    }

    #[test]
    fn test_extracted_info_tolerates_missing_formats() {
        let info: ExtractedInfo = serde_json::from_str(r#"{"title": null, "formats": null}"#).unwrap();
        assert!(info.title.is_none());
        assert!(info.formats.is_empty());
    }

    #[test]
    fn test_float_and_odd_numbers_are_read_per_record() {
        let json = r#"{
            "title": "Clip",
            "duration": "n/a",
            "formats": [
                {"format_id": "18", "ext": "mp4", "vcodec": "avc1", "acodec": "mp4a", "height": 360.0, "filesize": 1048576.0},
                {"format_id": "140", "ext": "m4a", "vcodec": "none", "acodec": "mp4a", "abr": 129, "filesize": "big"},
                {"format_id": "137", "ext": "mp4", "vcodec": "avc1", "acodec": "none", "height": -1, "filesize": 2097152}
            ]
        }"#;
        let info: ExtractedInfo = serde_json::from_str(json).unwrap();

        assert_eq!(info.duration, None);
        assert_eq!(info.formats.len(), 3);
        assert_eq!(info.formats[0].height, Some(360));
        assert_eq!(info.formats[0].filesize, Some(1_048_576));
        assert_eq!(
            crate::download::formats::size_label(info.formats[0].filesize),
            "1.0MB"
        );
        assert_eq!(info.formats[1].abr, Some(129.0));
        assert_eq!(info.formats[1].filesize, None);
        assert_eq!(info.formats[2].height, None);
        assert_eq!(info.formats[2].filesize, Some(2_097_152));
    }

    #[test]
    fn test_value_as_u64() {
        assert_eq!(value_as_u64(&serde_json::json!(42)), Some(42));
        assert_eq!(value_as_u64(&serde_json::json!(42.9)), Some(42));
        assert_eq!(value_as_u64(&serde_json::json!(-3.0)), None);
        assert_eq!(value_as_u64(&serde_json::json!("42")), None);
    }

    #[test]
    fn test_prepared_filename_falls_back_to_internal_field() {
        let info: ExtractedInfo = serde_json::from_str(r#"{"_filename": "downloads/Clip.mp4"}"#).unwrap();
        assert_eq!(info.prepared_filename(), Some("downloads/Clip.mp4"));
    }
}
