use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;

use mediagrab::cli::{Cli, Commands};
use mediagrab::core::{config, init_logger, log_startup_configuration, start_web_server, ServerConfig};
use mediagrab::download::{fetch_formats, ytdlp, MediaExtractor, YtDlpExtractor};

/// Main entry point
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, binding the listener).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env before any config static is read
    let _ = dotenv();

    // Initialize logger (console + file)
    init_logger(&config::LOG_FILE_PATH)?;

    match cli.command {
        Some(Commands::Serve {
            host,
            port,
            download_dir,
        }) => {
            let server_config = ServerConfig::from_env()
                .with_host(host)
                .with_port(port)
                .with_download_dir(download_dir);
            run_server(server_config).await
        }
        Some(Commands::Info { url, json }) => run_cli_info(url, json).await,
        Some(Commands::CheckYtdlp) => {
            ytdlp::print_ytdlp_version(&config::YTDL_BIN).await?;
            Ok(())
        }
        None => {
            log::info!("No command specified, running web server");
            run_server(ServerConfig::from_env()).await
        }
    }
}

/// Run the web server until it fails
async fn run_server(server_config: ServerConfig) -> Result<()> {
    log_startup_configuration(&server_config, &config::YTDL_BIN);

    let extractor: Arc<dyn MediaExtractor> = Arc::new(YtDlpExtractor::default());
    start_web_server(server_config, extractor).await?;

    Ok(())
}

/// Print the format summary for a URL
async fn run_cli_info(url: String, json: bool) -> Result<()> {
    let extractor = YtDlpExtractor::default();
    let summary = fetch_formats(&extractor, &url).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("{}", summary.title);
    println!("Duration: {}s", summary.duration);
    if !summary.thumbnail.is_empty() {
        println!("Thumbnail: {}", summary.thumbnail);
    }

    println!("\nVideo formats:");
    for option in &summary.videos {
        println!("  {:<40} {}", option.label, option.format_id);
    }

    println!("\nAudio formats:");
    for option in &summary.audios {
        println!("  {:<40} {}", option.label, option.format_id);
    }

    Ok(())
}
