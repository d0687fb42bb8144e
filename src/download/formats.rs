//! Format classification.
//!
//! Splits the extractor's format records into labelled video and audio options
//! and orders each list by descending quality. Labels double as the keys shown
//! to the user, so two records producing the same label collapse into one
//! entry (last write wins).

use crate::download::extractor::{ExtractedInfo, FormatRecord};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Containers offered for video downloads
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm"];

/// Containers offered for audio downloads
pub const AUDIO_EXTENSIONS: &[&str] = &["m4a", "webm"];

pub const DEFAULT_TITLE: &str = "Unknown Title";
pub const UNKNOWN_SIZE: &str = "Unknown size";

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Coarse audio quality bucket shown next to the bitrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioTier {
    Low,
    Medium,
    High,
}

impl AudioTier {
    /// low < 128 kbps <= medium < 256 kbps <= high
    pub fn from_bitrate(abr: f64) -> Self {
        if abr < 128.0 {
            AudioTier::Low
        } else if abr < 256.0 {
            AudioTier::Medium
        } else {
            AudioTier::High
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AudioTier::Low => "low",
            AudioTier::Medium => "medium",
            AudioTier::High => "high",
        }
    }
}

impl fmt::Display for AudioTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable format: display label plus the extractor's identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOption {
    pub label: String,
    pub format_id: String,
    /// Height for video, integer bitrate for audio
    rank: u64,
}

impl FormatOption {
    pub fn rank(&self) -> u64 {
        self.rank
    }
}

/// Ordered label → identifier list.
///
/// Serializes as a JSON object whose key order is the list order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatOptions(Vec<FormatOption>);

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an option; an existing label keeps its position and takes the
    /// new identifier.
    pub fn insert(&mut self, label: String, format_id: String, rank: u64) {
        if let Some(existing) = self.0.iter_mut().find(|option| option.label == label) {
            existing.format_id = format_id;
            existing.rank = rank;
        } else {
            self.0.push(FormatOption { label, format_id, rank });
        }
    }

    /// Stable sort, best quality first.
    pub fn sort_descending(&mut self) {
        self.0.sort_by(|a, b| b.rank.cmp(&a.rank));
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|option| option.label == label)
            .map(|option| option.format_id.as_str())
    }

    pub fn labels(&self) -> Vec<&str> {
        self.0.iter().map(|option| option.label.as_str()).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FormatOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a FormatOptions {
    type Item = &'a FormatOption;
    type IntoIter = std::slice::Iter<'a, FormatOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for FormatOptions {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for option in &self.0 {
            map.serialize_entry(&option.label, &option.format_id)?;
        }
        map.end()
    }
}

/// Everything the page needs to render the format pickers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfoSummary {
    pub title: String,
    pub thumbnail: String,
    pub duration: u64,
    pub videos: FormatOptions,
    pub audios: FormatOptions,
}

/// `"12.3MB"`, or `"Unknown size"` when the size is absent or zero.
pub fn size_label(filesize: Option<u64>) -> String {
    match filesize {
        Some(bytes) if bytes > 0 => format!("{:.1}MB", bytes as f64 / BYTES_PER_MB),
        _ => UNKNOWN_SIZE.to_string(),
    }
}

/// `"1080p (mp4) 12.3MB"`
pub fn video_label(height: u32, ext: &str, size: &str) -> String {
    format!("{}p ({}) {}", height, ext, size)
}

/// `"160kbps (medium) 3.4MB"`
pub fn audio_label(bitrate: u64, tier: AudioTier, size: &str) -> String {
    format!("{}kbps ({}) {}", bitrate, tier, size)
}

/// Partitions records into (videos, audios), each sorted best-first.
///
/// Records that are neither video- nor audio-coded are dropped, as are
/// records with an unknown/zero height or bitrate and records whose container
/// is outside the allow-list for their kind.
pub fn classify_formats(formats: &[FormatRecord]) -> (FormatOptions, FormatOptions) {
    let mut videos = FormatOptions::new();
    let mut audios = FormatOptions::new();

    for format in formats {
        let size = size_label(format.filesize);

        if format.has_video() {
            let Some(height) = format.height.filter(|h| *h > 0) else {
                continue;
            };
            if !VIDEO_EXTENSIONS.contains(&format.ext.as_str()) {
                continue;
            }
            let label = video_label(height, &format.ext, &size);
            videos.insert(label, format.format_id.clone(), u64::from(height));
        } else if format.has_audio() {
            let Some(abr) = format.abr.filter(|abr| *abr > 0.0) else {
                continue;
            };
            if !AUDIO_EXTENSIONS.contains(&format.ext.as_str()) {
                continue;
            }
            let bitrate = abr.trunc() as u64;
            let label = audio_label(bitrate, AudioTier::from_bitrate(abr), &size);
            audios.insert(label, format.format_id.clone(), bitrate);
        }
    }

    videos.sort_descending();
    audios.sort_descending();

    (videos, audios)
}

/// Builds the page summary from the extractor's metadata.
pub fn summarize(info: &ExtractedInfo) -> VideoInfoSummary {
    let (videos, audios) = classify_formats(&info.formats);

    log::debug!(
        "Classified {} formats into {} video and {} audio options",
        info.formats.len(),
        videos.len(),
        audios.len()
    );

    VideoInfoSummary {
        title: info.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        thumbnail: info.thumbnail.clone().unwrap_or_default(),
        duration: info.duration.map(|secs| secs.max(0.0) as u64).unwrap_or(0),
        videos,
        audios,
    }
}
