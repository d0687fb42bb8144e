//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the extractor binary and folders

use anyhow::Result;
use simplelog::*;
use std::fs::File;
use std::path::Path;
use std::process::Command;

use crate::core::config::ServerConfig;

/// Initialize logger for both console and file output
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = File::create(log_file_path).map_err(|e| anyhow::anyhow!("Failed to create log file: {}", e))?;

    CombinedLogger::init(vec![
        TermLogger::new(
            LevelFilter::Info,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Info, Config::default(), log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the resolved configuration at application startup
///
/// Checks:
/// - the yt-dlp binary can be executed (and which version it is)
/// - the download folder and the static page location
pub fn log_startup_configuration(config: &ServerConfig, ytdl_bin: &str) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("Startup Configuration Check");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    match Command::new(ytdl_bin).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("✅ YTDL_BIN: {} (version {})", ytdl_bin, version);
        }
        Ok(output) => {
            log::warn!(
                "⚠️  YTDL_BIN: {} exited with {:?} on --version",
                ytdl_bin,
                output.status.code()
            );
        }
        Err(e) => {
            log::error!("❌ YTDL_BIN: {} cannot be executed: {}", ytdl_bin, e);
            log::error!("   Every format listing and download will FAIL!");
            log::error!("   Install yt-dlp or point YTDL_BIN at the binary.");
        }
    }

    log::info!("📁 DOWNLOAD_FOLDER: {}", describe_dir(&config.download_dir));

    let index = config.static_dir.join("index.html");
    if index.is_file() {
        log::info!("📄 STATIC_DIR: {}", config.static_dir.display());
    } else {
        log::warn!("⚠️  STATIC_DIR: {} (index.html NOT FOUND, / will return 404)", config.static_dir.display());
    }

    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}

fn describe_dir(dir: &Path) -> String {
    match dir.canonicalize() {
        Ok(abs_path) => abs_path.display().to_string(),
        Err(_) => format!("{} (will be created)", dir.display()),
    }
}
