//! media-dl server: REST API and live event stream over the download core.

use clap::Parser;
use media_dl::{Config, MediaDownloader, run_with_shutdown};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "media_dl=info,tower_http=info";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Address to listen on (overrides the config file)
    #[arg(short = 'b', long = "bind", value_name = "ADDR")]
    bind: Option<SocketAddr>,

    /// Download directory (overrides the config file)
    #[arg(short = 'd', long = "download-dir", value_name = "DIR")]
    download_dir: Option<PathBuf>,

    /// Path to the yt-dlp executable (overrides the config file)
    #[arg(long = "ytdlp", value_name = "PATH")]
    ytdlp: Option<PathBuf>,

    /// API key required in the X-Api-Key header
    #[arg(long = "api-key", value_name = "KEY", env = "MEDIA_DL_API_KEY")]
    api_key: Option<String>,
}

impl Cli {
    fn load_config(&self) -> media_dl::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?,
            None => Config::default(),
        };

        if let Some(bind) = self.bind {
            config.server.api.bind_address = bind;
        }
        if let Some(dir) = &self.download_dir {
            config.download.download_dir = dir.clone();
        }
        if let Some(path) = &self.ytdlp {
            config.tools.ytdlp_path = Some(path.clone());
        }
        if let Some(key) = &self.api_key {
            config.server.api.api_key = Some(key.clone());
        }
        Ok(config)
    }
}

fn setup_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "media-dl stopped");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> media_dl::Result<()> {
    let config = cli.load_config()?;
    tracing::info!(
        download_dir = %config.download_dir().display(),
        "Starting media-dl"
    );

    let downloader = Arc::new(MediaDownloader::new(config).await?);
    let mut server = downloader.spawn_api_server();

    tokio::select! {
        result = &mut server => {
            let outcome = match result {
                Ok(result) => result,
                Err(e) => Err(media_dl::Error::ApiServerError(e.to_string())),
            };
            downloader.shutdown().await?;
            outcome
        }
        result = run_with_shutdown((*downloader).clone()) => {
            server.abort();
            result
        }
    }
}
