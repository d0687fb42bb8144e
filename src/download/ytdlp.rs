//! YtDlpExtractor: the `MediaExtractor` backend powered by the yt-dlp binary.
//!
//! Metadata is read with `--dump-single-json` (no media is fetched). Downloads
//! run with `--dump-json --no-simulate` so the info dict of what was actually
//! retrieved comes back on stdout once yt-dlp is done.

use crate::core::config;
use crate::core::error::AppError;
use crate::download::error::DownloadError;
use crate::download::extractor::{DownloadRequest, ExtractedInfo, FormatKind, MediaExtractor};
use async_trait::async_trait;
use std::process::Output;
use tokio::process::Command as TokioCommand;

/// Download source powered by yt-dlp.
#[derive(Debug, Clone)]
pub struct YtDlpExtractor {
    bin: String,
}

impl Default for YtDlpExtractor {
    fn default() -> Self {
        Self::new(config::YTDL_BIN.as_str())
    }
}

impl YtDlpExtractor {
    pub fn new(bin: impl Into<String>) -> Self {
        Self { bin: bin.into() }
    }

    pub fn bin(&self) -> &str {
        &self.bin
    }

    /// Runs yt-dlp and returns its stdout, mapping every failure to
    /// `DownloadError::Extraction`.
    async fn run(&self, args: &[String]) -> Result<Vec<u8>, AppError> {
        log::debug!("yt-dlp command: {} {}", self.bin, args.join(" "));

        let output = TokioCommand::new(&self.bin).args(args).output().await.map_err(|e| {
            log::error!("Failed to execute {}: {}", self.bin, e);
            DownloadError::Extraction(format!("Failed to execute {}: {}", self.bin, e))
        })?;

        if !output.status.success() {
            let message = failure_message(&output);
            log::error!("yt-dlp failed ({:?}): {}", output.status.code(), message);
            return Err(DownloadError::Extraction(message).into());
        }

        Ok(output.stdout)
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn extract_info(&self, url: &str) -> Result<ExtractedInfo, AppError> {
        let stdout = self.run(&build_info_args(url)).await?;
        parse_info_output(&stdout)
    }

    async fn download(&self, request: &DownloadRequest) -> Result<ExtractedInfo, AppError> {
        let stdout = self.run(&build_download_args(request)).await?;
        parse_info_output(&stdout)
    }
}

/// Arguments for a metadata-only extraction.
pub fn build_info_args(url: &str) -> Vec<String> {
    [
        "--dump-single-json",
        "--flat-playlist",
        "--no-warnings",
        "--no-color",
        "--",
        url,
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Format selector for the download: the chosen id alone for audio, merged
/// with the best audio track for video.
pub fn format_selector(kind: FormatKind, format_id: &str) -> String {
    match kind {
        FormatKind::AudioOnly => format_id.to_string(),
        FormatKind::Video => format!("{}+{}", format_id, config::download::BEST_AUDIO_SELECTOR),
    }
}

/// Arguments for an extraction+download run.
pub fn build_download_args(request: &DownloadRequest) -> Vec<String> {
    let output_template = request.output_dir.join(config::download::OUTPUT_TEMPLATE);

    let mut args: Vec<String> = vec![
        "--output".to_string(),
        output_template.to_string_lossy().into_owned(),
        "--format".to_string(),
        format_selector(request.kind, &request.format_id),
        "--no-warnings".to_string(),
        "--no-color".to_string(),
        "--no-check-certificate".to_string(),
        "--abort-on-error".to_string(),
        "--user-agent".to_string(),
        config::download::USER_AGENT.to_string(),
    ];

    match request.kind {
        FormatKind::AudioOnly => {
            args.extend(
                [
                    "--extract-audio",
                    "--audio-format",
                    config::download::AUDIO_CODEC,
                    "--audio-quality",
                    config::download::AUDIO_QUALITY,
                ]
                .iter()
                .map(|s| s.to_string()),
            );
        }
        FormatKind::Video => {
            args.push("--merge-output-format".to_string());
            args.push(config::download::MERGE_CONTAINER.to_string());
        }
    }

    // Print the info dict of what was downloaded instead of progress output
    args.push("--dump-json".to_string());
    args.push("--no-simulate".to_string());
    args.push("--".to_string());
    args.push(request.url.clone());

    args
}

/// Parses the JSON yt-dlp printed; with several documents the last one wins.
pub fn parse_info_output(stdout: &[u8]) -> Result<ExtractedInfo, AppError> {
    let text = String::from_utf8_lossy(stdout);
    let Some(json_line) = text.lines().rev().map(str::trim).find(|line| line.starts_with('{')) else {
        return Err(DownloadError::Extraction("yt-dlp returned no metadata".to_string()).into());
    };

    serde_json::from_str(json_line).map_err(|e| {
        log::error!("Failed to parse yt-dlp output: {}", e);
        DownloadError::Extraction(format!("Failed to parse yt-dlp output: {}", e)).into()
    })
}

/// The last `ERROR:` line of stderr, or the whole stderr, or the exit status.
fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);

    if let Some(line) = stderr.lines().rev().map(str::trim).find(|line| line.starts_with("ERROR:")) {
        return line.to_string();
    }

    let trimmed = stderr.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }

    match output.status.code() {
        Some(code) => format!("yt-dlp exited with status {}", code),
        None => "yt-dlp was terminated by a signal".to_string(),
    }
}

/// Returns the installed yt-dlp version string.
pub async fn ytdlp_version(bin: &str) -> Result<String, AppError> {
    let output = TokioCommand::new(bin)
        .arg("--version")
        .output()
        .await
        .map_err(|e| DownloadError::Extraction(format!("Failed to get yt-dlp version: {}", e)))?;

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if version.is_empty() {
        return Err(DownloadError::Extraction("yt-dlp is not installed or --version produced no output".to_string()).into());
    }

    Ok(version)
}

/// Prints the current yt-dlp version.
pub async fn print_ytdlp_version(bin: &str) -> Result<(), AppError> {
    log::info!("Checking yt-dlp version...");

    let version = ytdlp_version(bin).await?;

    println!("yt-dlp version: {}", version);
    log::info!("yt-dlp version: {}", version);

    Ok(())
}
