//! Public-facing web server.
//!
//! Serves the static page at `/` plus the two form endpoints the page posts
//! to: `/get_formats` (JSON format lists) and `/download` (file attachment).
//! Runs on WEB_HOST:WEB_PORT (default 127.0.0.1:5000).

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::{FromRequest, Multipart, Request, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::io::ReaderStream;
use tower_http::services::ServeFile;

use crate::core::config::ServerConfig;
use crate::core::error::{AppError, AppResult};
use crate::download::extractor::{DownloadRequest, FormatKind, MediaExtractor};
use crate::download::pipeline::{download_media, fetch_formats};

/// Shared state for the web server.
#[derive(Clone)]
struct WebState {
    extractor: Arc<dyn MediaExtractor>,
    download_dir: Arc<PathBuf>,
}

/// Form posted to `/get_formats`.
#[derive(Debug, Default, Deserialize)]
struct FormatsForm {
    url: Option<String>,
}

/// Form posted to `/download`.
#[derive(Debug, Default, Deserialize)]
struct DownloadForm {
    url: Option<String>,
    format: Option<String>,
    quality: Option<String>,
}

/// Form fields from either a urlencoded or a multipart body.
///
/// `None` when the body is neither or cannot be read; handlers treat that the
/// same as absent fields. File parts are skipped and the first value of a
/// repeated text field wins.
struct FormFields<T>(Option<T>);

#[async_trait]
impl<S, T> FromRequest<S> for FormFields<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("multipart/form-data"));

        if !is_multipart {
            let form = Form::<T>::from_request(req, state).await.ok();
            return Ok(FormFields(form.map(|Form(fields)| fields)));
        }

        let fields = match Multipart::from_request(req, state).await {
            Ok(multipart) => multipart_text_fields(multipart).await,
            Err(_) => None,
        };
        Ok(FormFields(
            fields.and_then(|fields| serde_json::from_value(Value::Object(fields)).ok()),
        ))
    }
}

async fn multipart_text_fields(mut multipart: Multipart) -> Option<Map<String, Value>> {
    let mut fields = Map::new();

    while let Some(field) = multipart.next_field().await.ok()? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            continue;
        }
        let text = field.text().await.ok()?;
        fields.entry(name).or_insert(Value::String(text));
    }

    Some(fields)
}

/// Builds the router with the download folder and extractor injected as state.
pub fn build_router(config: &ServerConfig, extractor: Arc<dyn MediaExtractor>) -> Router {
    let state = WebState {
        extractor,
        download_dir: Arc::new(config.download_dir.clone()),
    };

    Router::new()
        .route_service("/", ServeFile::new(config.static_dir.join("index.html")))
        .route("/get_formats", post(get_formats_handler))
        .route("/download", post(download_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the public web server.
pub async fn start_web_server(config: ServerConfig, extractor: Arc<dyn MediaExtractor>) -> AppResult<()> {
    tokio::fs::create_dir_all(&config.download_dir).await?;

    let addr = config.socket_addr();
    let app = build_router(&config, extractor);

    log::info!("Starting web server on http://{}", addr);
    log::info!("  /             - Page (HTML)");
    log::info!("  /get_formats  - List formats (POST, JSON)");
    log::info!("  /download     - Download a format (POST, attachment)");
    log::info!("  /health       - Health check");

    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// POST /get_formats: lists the video and audio formats for `url`.
async fn get_formats_handler(State(state): State<WebState>, FormFields(form): FormFields<FormatsForm>) -> Response {
    let url = form.and_then(|form| non_empty(form.url));
    let Some(url) = url else {
        return json_error(StatusCode::BAD_REQUEST, "No URL provided");
    };

    match fetch_formats(state.extractor.as_ref(), &url).await {
        Ok(summary) => Json(summary).into_response(),
        Err(e) => json_error(status_for(&e), &e.to_string()),
    }
}

/// POST /download: downloads the chosen format and streams it back.
async fn download_handler(State(state): State<WebState>, FormFields(form): FormFields<DownloadForm>) -> Response {
    let form = form.unwrap_or_default();
    let (Some(url), Some(format), Some(format_id)) =
        (non_empty(form.url), non_empty(form.format), non_empty(form.quality))
    else {
        return (StatusCode::BAD_REQUEST, "Missing parameters").into_response();
    };

    let request = DownloadRequest {
        url,
        kind: FormatKind::from_form_value(&format),
        format_id,
        output_dir: state.download_dir.as_ref().clone(),
    };

    let result = match download_media(state.extractor.as_ref(), &request).await {
        Ok(path) => attachment_response(&path).await,
        Err(e) => Err(e),
    };

    result.unwrap_or_else(|e| {
        log::error!("Download error: {}", e);
        (status_for(&e), format!("Download failed: {}", e)).into_response()
    })
}

/// GET /health: simple health check.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

/// Streams `path` as an attachment named by its base filename.
async fn attachment_response(path: &Path) -> AppResult<Response> {
    let file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "download.bin".to_string());

    // Always visible ASCII after sanitizing and percent-encoding
    let disposition = HeaderValue::from_str(&build_content_disposition(&filename))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

    let mut response = Response::new(Body::from_stream(ReaderStream::new(file)));
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for_filename(&filename)));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
    headers.insert(CONTENT_DISPOSITION, disposition);

    Ok(response)
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

fn status_for(err: &AppError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn content_type_for_filename(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "m4a" => "audio/mp4",
        _ => "application/octet-stream",
    }
}

fn build_content_disposition(filename: &str) -> String {
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitize_ascii_filename(filename),
        urlencoding::encode(filename)
    )
}

fn sanitize_ascii_filename(value: &str) -> String {
    let sanitized: String = value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ' ' | '(' | ')') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let compact = sanitized.trim();
    if compact.is_empty() {
        "download.bin".to_string()
    } else {
        compact.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_for_filename() {
        assert_eq!(content_type_for_filename("Song.mp3"), "audio/mpeg");
        assert_eq!(content_type_for_filename("Clip.MP4"), "video/mp4");
        assert_eq!(content_type_for_filename("noext"), "application/octet-stream");
    }

    #[test]
    fn test_content_disposition_ascii() {
        assert_eq!(
            build_content_disposition("My Song.mp3"),
            "attachment; filename=\"My Song.mp3\"; filename*=UTF-8''My%20Song.mp3"
        );
    }

    #[test]
    fn test_content_disposition_non_ascii_is_header_safe() {
        let value = build_content_disposition("Привет \"мир\".mp4");
        assert!(value.starts_with("attachment; filename=\""));
        assert!(value.is_ascii());
        assert!(HeaderValue::from_str(&value).is_ok());
    }

    #[test]
    fn test_sanitize_ascii_filename_fallback() {
        assert_eq!(sanitize_ascii_filename("   "), "download.bin");
        assert_eq!(sanitize_ascii_filename("a/b:c.mp3"), "a_b_c.mp3");
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(None), None);
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("x".into())), Some("x".to_string()));
    }
}
