use anyhow::{ensure, Result};
use clap::{Parser, ValueEnum};
use std::{path::PathBuf, time::Duration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Directory downloaded videos are saved to
    #[arg(short, long, env = "REELGRAB_OUTPUT_DIR", default_value = "downloads")]
    pub output_dir: PathBuf,

    /// Highest video resolution to download, in pixels of height (e.g. 720)
    #[arg(long, env = "REELGRAB_MAX_HEIGHT")]
    pub max_height: Option<u32>,

    /// Path to the yt-dlp executable
    #[arg(long = "yt-dlp", env = "YTDLP_PATH", default_value = "yt-dlp")]
    pub ytdlp: PathBuf,

    /// Format of diagnostic logs written to stderr
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Minimum time between progress bar redraws
    #[arg(long, default_value_t = 100)]
    pub progress_interval_ms: u64,

    /// How long to wait for video information before giving up
    #[arg(long, default_value_t = 30)]
    pub probe_timeout_secs: u64,
}

/// Runtime settings for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_dir: PathBuf,
    pub max_height: Option<u32>,
    pub ytdlp: PathBuf,
    pub log_format: LogFormat,
    pub progress_interval: Duration,
    pub probe_timeout: Duration,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        ensure!(
            args.max_height != Some(0),
            "--max-height must be greater than zero"
        );
        ensure!(
            args.progress_interval_ms > 0,
            "--progress-interval-ms must be greater than zero"
        );
        ensure!(
            args.probe_timeout_secs > 0,
            "--probe-timeout-secs must be greater than zero"
        );

        Ok(Self {
            output_dir: args.output_dir,
            max_height: args.max_height,
            ytdlp: args.ytdlp,
            log_format: args.log_format,
            progress_interval: Duration::from_millis(args.progress_interval_ms),
            probe_timeout: Duration::from_secs(args.probe_timeout_secs),
        })
    }
}
