use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

mod config;
mod media;
mod platform;
mod session;
mod shell;
mod utils;

use config::{Args, Config, LogFormat};
use media::{DownloadCoordinator, YtDlpDownloader};
use shell::{Shell, TerminalPrompter};

fn init_logging(format: LogFormat) {
    // Logs share the terminal with the menus, so only warnings by default
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = Config::from_args(Args::parse())?;
    init_logging(config.log_format);

    info!("Starting reelgrab...");
    info!("Saving videos to {}", config.output_dir.display());

    let backend = YtDlpDownloader::new(config.ytdlp.clone(), config.probe_timeout);
    backend.test_availability().await.with_context(|| {
        format!(
            "yt-dlp is required but could not be run from {}.\n\
             Install it with `pip install -U yt-dlp` (or your package manager), \
             or point --yt-dlp / YTDLP_PATH at the executable.",
            config.ytdlp.display()
        )
    })?;

    let coordinator = DownloadCoordinator::new(Box::new(backend));
    Shell::new(coordinator, TerminalPrompter::new(), &config)
        .run()
        .await;

    Ok(())
}
