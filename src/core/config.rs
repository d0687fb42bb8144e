use once_cell::sync::Lazy;
use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Configuration values for the web front-end
/// Cached yt-dlp binary path
/// Read once at startup from YTDL_BIN environment variable or defaults to "yt-dlp"
pub static YTDL_BIN: Lazy<String> = Lazy::new(|| env::var("YTDL_BIN").unwrap_or_else(|_| "yt-dlp".to_string()));

/// Download folder path
/// Read from DOWNLOAD_FOLDER environment variable
/// Defaults to "downloads" relative to the working directory
/// Supports tilde (~) expansion for home directory
pub static DOWNLOAD_FOLDER: Lazy<String> =
    Lazy::new(|| env::var("DOWNLOAD_FOLDER").unwrap_or_else(|_| "downloads".to_string()));

/// Directory holding the static page served at `/`
/// Read from STATIC_DIR environment variable
/// Default: static
pub static STATIC_DIR: Lazy<String> = Lazy::new(|| env::var("STATIC_DIR").unwrap_or_else(|_| "static".to_string()));

/// Log file path
/// Read from LOG_FILE_PATH environment variable
/// Default: mediagrab.log
pub static LOG_FILE_PATH: Lazy<String> =
    Lazy::new(|| env::var("LOG_FILE_PATH").unwrap_or_else(|_| "mediagrab.log".to_string()));

/// Address the web server binds to
/// Read from WEB_HOST environment variable
/// Default: 127.0.0.1 (local development server)
pub static WEB_HOST: Lazy<IpAddr> = Lazy::new(|| {
    env::var("WEB_HOST")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
});

/// Port the web server listens on
/// Read from WEB_PORT environment variable
/// Default: 5000
pub static WEB_PORT: Lazy<u16> = Lazy::new(|| {
    env::var("WEB_PORT")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(5000)
});

/// Expands `~` in a configured path.
pub fn expand_path(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

/// Download invocation configuration
pub mod download {
    /// User-Agent sent instead of yt-dlp's default, to reduce 403s from origin servers
    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

    /// Codec audio-only downloads are transcoded to
    pub const AUDIO_CODEC: &str = "mp3";

    /// Target audio quality passed to the transcoder (320 kbps)
    pub const AUDIO_QUALITY: &str = "320K";

    /// Container video downloads are merged into
    pub const MERGE_CONTAINER: &str = "mp4";

    /// Selector appended to the chosen video format
    pub const BEST_AUDIO_SELECTOR: &str = "bestaudio";

    /// Output file template, relative to the download folder
    pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";
}

/// Runtime configuration for the web server.
///
/// Built once at start-up from the environment (and CLI overrides) and shared
/// with every handler through axum state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub download_dir: PathBuf,
    pub static_dir: PathBuf,
}

impl ServerConfig {
    /// Reads the configuration from the environment-backed statics.
    pub fn from_env() -> Self {
        Self {
            host: *WEB_HOST,
            port: *WEB_PORT,
            download_dir: expand_path(&DOWNLOAD_FOLDER),
            static_dir: expand_path(&STATIC_DIR),
        }
    }

    pub fn with_host(mut self, host: Option<IpAddr>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        self
    }

    pub fn with_port(mut self, port: Option<u16>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    pub fn with_download_dir(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir {
            self.download_dir = expand_path(&dir);
        }
        self
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ServerConfig {
        ServerConfig {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 5000,
            download_dir: PathBuf::from("downloads"),
            static_dir: PathBuf::from("static"),
        }
    }

    #[test]
    fn test_overrides_apply_only_when_present() {
        let config = sample().with_host(None).with_port(None).with_download_dir(None);
        assert_eq!(config, sample());

        let config = sample()
            .with_host(Some(IpAddr::V4(Ipv4Addr::UNSPECIFIED)))
            .with_port(Some(8080))
            .with_download_dir(Some("/srv/media".to_string()));
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.download_dir, PathBuf::from("/srv/media"));
    }

    #[test]
    fn test_expand_path_keeps_relative_paths() {
        assert_eq!(expand_path("downloads"), PathBuf::from("downloads"));
    }

    #[test]
    fn test_download_constants() {
        assert_eq!(download::AUDIO_CODEC, "mp3");
        assert_eq!(download::MERGE_CONTAINER, "mp4");
        assert!(download::USER_AGENT.starts_with("Mozilla/5.0"));
    }
}
