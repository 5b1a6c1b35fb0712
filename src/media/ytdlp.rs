use super::{
    downloader::Downloader,
    errors::DownloadError,
    progress::{ProgressSink, ProgressState, Stage},
    types::{DownloadOptions, DownloadedFile, MediaMetadata},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::{
    path::{Path, PathBuf},
    process::Stdio,
    time::Duration,
};
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    process::Command,
};
use tracing::{debug, info, warn};

const PROGRESS_TEMPLATE: &str = "download:[progress] %(progress.status)s|%(progress.downloaded_bytes)s|%(progress.total_bytes)s|%(progress.total_bytes_estimate)s|%(progress.speed)s|%(progress.eta)s";
const POSTPROCESS_TEMPLATE: &str =
    "postprocess:[postprocess] %(progress.status)s|%(progress.postprocessor)s";
const FILE_TEMPLATE: &str = "after_move:[file] %(filepath)s";

/// A line of yt-dlp output that means something to us
#[derive(Debug, PartialEq)]
enum OutputLine {
    Progress(ProgressState),
    File(PathBuf),
}

/// What was collected from a finished yt-dlp run.
#[derive(Debug, Default)]
struct RunOutput {
    path: Option<PathBuf>,
    /// Every stderr line that wasn't progress, for error classification
    errors: String,
}

pub struct YtDlpDownloader {
    program: PathBuf,
    probe_timeout: Duration,
}

impl YtDlpDownloader {
    pub fn new(program: impl Into<PathBuf>, probe_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            probe_timeout,
        }
    }

    /// Checks that yt-dlp runs and returns its version.
    pub async fn test_availability(&self) -> Result<String> {
        let output = Command::new(&self.program)
            .arg("--version")
            .output()
            .await
            .with_context(|| format!("{} could not be started", self.program.display()))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{} --version failed: {}", self.program.display(), error.trim());
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("✅ yt-dlp is available, version: {}", version);

        // ffmpeg is only needed to merge separate video and audio streams
        match Command::new("ffmpeg").arg("-version").output().await {
            Ok(output) if output.status.success() => {
                let version_line = String::from_utf8_lossy(&output.stdout)
                    .lines()
                    .next()
                    .unwrap_or("unknown")
                    .to_string();
                info!("✅ ffmpeg is available: {}", version_line);
            }
            Ok(_) => warn!("❌ ffmpeg command failed"),
            Err(e) => warn!(
                "❌ ffmpeg not found: {} (required for merging video and audio streams)",
                e
            ),
        }

        Ok(version)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

fn download_args(url: &str, options: &DownloadOptions) -> Vec<String> {
    vec![
        "--no-playlist".to_string(),
        "--no-warnings".to_string(),
        "--newline".to_string(),
        "--progress".to_string(),
        "--progress-template".to_string(),
        PROGRESS_TEMPLATE.to_string(),
        "--progress-template".to_string(),
        POSTPROCESS_TEMPLATE.to_string(),
        "--print".to_string(),
        FILE_TEMPLATE.to_string(),
        "--format".to_string(),
        options.format.clone(),
        "--output".to_string(),
        options.output_template.to_string_lossy().to_string(),
        url.to_string(),
    ]
}

fn parse_line(line: &str) -> Option<OutputLine> {
    let line = line.trim_end();

    if let Some(rest) = line.strip_prefix("[progress] ") {
        return parse_progress(rest).map(OutputLine::Progress);
    }

    if line.starts_with("[postprocess] ") {
        return Some(OutputLine::Progress(ProgressState::stage(Stage::Converting)));
    }

    if let Some(path) = line.strip_prefix("[file] ") {
        let path = path.trim();
        if !path.is_empty() && path != "NA" {
            return Some(OutputLine::File(PathBuf::from(path)));
        }
    }

    None
}

fn parse_progress(fields: &str) -> Option<ProgressState> {
    let mut fields = fields.split('|');
    let status = fields.next()?;
    let downloaded = number(fields.next()?);
    let total = number(fields.next()?);
    let estimate = number(fields.next()?);
    let speed = number(fields.next()?);
    let eta = number(fields.next()?);

    let stage = match status {
        "downloading" => Stage::Downloading,
        "finished" => Stage::Finished,
        _ => return None,
    };

    Some(ProgressState {
        downloaded_bytes: downloaded.map_or(0, |b| b as u64),
        total_bytes: total.or(estimate).map(|b| b as u64),
        speed,
        eta: eta.and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        stage,
    })
}

/// yt-dlp prints `NA` for missing values and floats for estimates.
fn number(field: &str) -> Option<f64> {
    field
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite() && *n >= 0.0)
}

/// Reads yt-dlp's stdout and stderr line by line until both close.
///
/// Download progress arrives on stdout, but with `--print` yt-dlp is quiet and
/// post-processing progress goes to stderr along with the errors.
async fn follow_output<O, E>(
    stdout: O,
    stderr: E,
    sink: &mut (dyn ProgressSink + Send),
) -> RunOutput
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut stdout = BufReader::new(stdout).lines();
    let mut stderr = BufReader::new(stderr).lines();
    let (mut stdout_open, mut stderr_open) = (true, true);
    let mut output = RunOutput::default();

    while stdout_open || stderr_open {
        tokio::select! {
            line = stdout.next_line(), if stdout_open => match line {
                Ok(Some(line)) => {
                    if !output.take(&line, sink) {
                        debug!("yt-dlp: {}", line);
                    }
                }
                Ok(None) => stdout_open = false,
                Err(e) => {
                    warn!("Failed to read yt-dlp output: {}", e);
                    stdout_open = false;
                }
            },
            line = stderr.next_line(), if stderr_open => match line {
                Ok(Some(line)) => {
                    if !output.take(&line, sink) {
                        output.errors.push_str(&line);
                        output.errors.push('\n');
                    }
                }
                Ok(None) => stderr_open = false,
                Err(e) => {
                    output.errors.push_str(&format!("Failed to read yt-dlp stderr: {e}\n"));
                    stderr_open = false;
                }
            },
        }
    }

    output
}

impl RunOutput {
    /// Handles a progress or file line, returning false for anything else.
    fn take(&mut self, line: &str, sink: &mut (dyn ProgressSink + Send)) -> bool {
        match parse_line(line) {
            Some(OutputLine::Progress(state)) => sink.on_progress(&state),
            Some(OutputLine::File(file)) => self.path = Some(file),
            None => return false,
        }
        true
    }
}

fn spawn_error(program: &Path, e: std::io::Error) -> DownloadError {
    DownloadError::Unknown(format!("Failed to run {}: {}", program.display(), e))
}

#[async_trait]
impl Downloader for YtDlpDownloader {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn inspect(&self, url: &str) -> Result<MediaMetadata, DownloadError> {
        debug!("Extracting metadata with yt-dlp for: {}", url);

        let output = tokio::time::timeout(
            self.probe_timeout,
            self.command()
                .arg("--dump-json")
                .arg("--no-download")
                .arg("--no-playlist")
                .arg("--no-warnings")
                .arg(url)
                .output(),
        )
        .await
        .map_err(|_| {
            DownloadError::Network(format!(
                "Metadata extraction timed out after {}s",
                self.probe_timeout.as_secs()
            ))
        })?
        .map_err(|e| spawn_error(&self.program, e))?;

        if !output.status.success() {
            let error = String::from_utf8_lossy(&output.stderr);
            return Err(DownloadError::classify(&error));
        }

        let json_str = String::from_utf8_lossy(&output.stdout);
        debug!("yt-dlp JSON output: {} bytes", json_str.len());

        serde_json::from_str(&json_str).map_err(|e| {
            DownloadError::Unknown(format!("Failed to parse media metadata: {e}"))
        })
    }

    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        sink: &mut (dyn ProgressSink + Send),
    ) -> Result<DownloadedFile, DownloadError> {
        info!("Downloading with yt-dlp: {} (format {})", url, options.format);

        let mut child = self
            .command()
            .args(download_args(url, options))
            .spawn()
            .map_err(|e| spawn_error(&self.program, e))?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DownloadError::Unknown("Failed to get yt-dlp stdout".to_string()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| DownloadError::Unknown("Failed to get yt-dlp stderr".to_string()))?;

        // Both pipes are drained together so a chatty stderr can't stall the child
        let output = follow_output(stdout, stderr, sink).await;

        let status = child
            .wait()
            .await
            .map_err(|e| DownloadError::Unknown(format!("Failed to wait for yt-dlp: {e}")))?;

        if !status.success() {
            warn!("yt-dlp exited with {}: {}", status, output.errors.trim());
            return Err(DownloadError::classify(&output.errors));
        }

        sink.on_progress(&ProgressState::stage(Stage::Finished));
        Ok(DownloadedFile { path: output.path })
    }
}
