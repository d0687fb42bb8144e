use clap::{Parser, Subcommand};
use std::net::IpAddr;

#[derive(Parser)]
#[command(name = "mediagrab")]
#[command(author, version, about = "Web front-end for listing and downloading media formats via yt-dlp", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the web server
    Serve {
        /// Address to bind (overrides WEB_HOST)
        #[arg(long)]
        host: Option<IpAddr>,

        /// Port to listen on (overrides WEB_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Folder downloaded files are written to (overrides DOWNLOAD_FOLDER)
        #[arg(short, long)]
        download_dir: Option<String>,
    },

    /// List the formats available for a URL
    Info {
        /// Video page URL
        url: String,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the installed yt-dlp version
    CheckYtdlp,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
