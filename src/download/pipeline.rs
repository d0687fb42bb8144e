//! The two operations behind the web handlers: list formats and download.

use crate::core::error::AppError;
use crate::download::error::DownloadError;
use crate::download::extractor::{DownloadRequest, ExtractedInfo, MediaExtractor};
use crate::download::formats::{summarize, VideoInfoSummary};
use std::path::PathBuf;

/// Placeholder yt-dlp substitutes for missing template fields
const MISSING_FIELD: &str = "NA";

/// Extracts metadata for `url` without downloading and classifies its formats.
pub async fn fetch_formats(extractor: &dyn MediaExtractor, url: &str) -> Result<VideoInfoSummary, AppError> {
    log::info!("Fetching formats via {} for {}", extractor.name(), url);

    let info = extractor.extract_info(url).await.inspect_err(|e| {
        log::error!("Error fetching formats for {}: {}", url, e);
    })?;

    let summary = summarize(&info);
    log::info!(
        "Found {} video and {} audio options for '{}'",
        summary.videos.len(),
        summary.audios.len(),
        summary.title
    );

    Ok(summary)
}

/// Downloads the requested format and returns the path of the final file.
///
/// Fails with `DownloadError::OutputMissing` when the extractor reports
/// success but nothing exists at the expected path.
pub async fn download_media(extractor: &dyn MediaExtractor, request: &DownloadRequest) -> Result<PathBuf, AppError> {
    log::info!(
        "Downloading {} (format {}, {:?}) via {}",
        request.url,
        request.format_id,
        request.kind,
        extractor.name()
    );

    let info = extractor.download(request).await.inspect_err(|e| {
        log::error!("Download error for {}: {}", request.url, e);
    })?;

    let path = expected_output_path(&info, request);

    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        log::error!("yt-dlp did not produce expected file: {}", path.display());
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        return Err(DownloadError::OutputMissing(format!("File not created: {}", name)).into());
    }

    log::info!("Download finished: {}", path.display());
    Ok(path)
}

/// Recomputes where the post-processed file ended up: the filename yt-dlp
/// prepared (or the output template rendered from title/ext) with the
/// extension replaced by the forced one.
pub fn expected_output_path(info: &ExtractedInfo, request: &DownloadRequest) -> PathBuf {
    let mut path = match info.prepared_filename() {
        Some(prepared) => PathBuf::from(prepared),
        None => {
            let title = info.title.as_deref().unwrap_or(MISSING_FIELD);
            let ext = info.ext.as_deref().unwrap_or(MISSING_FIELD);
            request.output_dir.join(format!("{}.{}", title, ext))
        }
    };

    path.set_extension(request.kind.target_extension());
    path
}
