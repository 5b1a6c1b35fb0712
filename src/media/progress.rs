use crate::utils::{format_bytes, format_duration};
use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Downloading,
    /// Post-processing such as merging audio and video
    Converting,
    Finished,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressState {
    pub downloaded_bytes: u64,
    pub total_bytes: Option<u64>,
    /// Bytes per second
    pub speed: Option<f64>,
    pub eta: Option<Duration>,
    pub stage: Stage,
}

impl ProgressState {
    pub fn stage(stage: Stage) -> Self {
        Self {
            downloaded_bytes: 0,
            total_bytes: None,
            speed: None,
            eta: None,
            stage,
        }
    }
}

/// Receives progress updates while a backend download runs.
pub trait ProgressSink {
    fn on_progress(&mut self, state: &ProgressState);

    /// Called once after the backend returns.
    fn finish(&mut self) {}
}

/// Draws progress somewhere. Errors are reported back to the reporter, which
/// logs and drops them.
pub trait Render {
    fn render(&mut self, state: &ProgressState) -> Result<()>;
}

/// Debounces progress updates into at most one render per interval.
///
/// Stage changes render immediately. The newest state is held back otherwise
/// and flushed by `finish`, so the last thing drawn is always the last update.
pub struct ProgressReporter<R: Render> {
    renderer: R,
    min_interval: Duration,
    last_render: Option<Instant>,
    last_stage: Option<Stage>,
    pending: Option<ProgressState>,
}

impl<R: Render> ProgressReporter<R> {
    pub fn new(renderer: R, min_interval: Duration) -> Self {
        Self {
            renderer,
            min_interval,
            last_render: None,
            last_stage: None,
            pending: None,
        }
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    fn draw(&mut self, state: &ProgressState) {
        if let Err(e) = self.renderer.render(state) {
            warn!("Failed to render progress: {:#}", e);
        }
        self.last_render = Some(Instant::now());
        self.last_stage = Some(state.stage);
        self.pending = None;
    }
}

impl<R: Render> ProgressSink for ProgressReporter<R> {
    fn on_progress(&mut self, state: &ProgressState) {
        let stage_changed = self.last_stage != Some(state.stage);
        let due = self
            .last_render
            .map_or(true, |at| at.elapsed() >= self.min_interval);

        if stage_changed || due {
            self.draw(state);
        } else {
            self.pending = Some(state.clone());
        }
    }

    fn finish(&mut self) {
        if let Some(state) = self.pending.take() {
            debug!("Flushing held-back progress update");
            self.draw(&state);
        }
    }
}

/// Terminal progress bar backed by indicatif.
pub struct BarRenderer {
    bar: Option<ProgressBar>,
}

impl BarRenderer {
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn bar_for(&mut self, total: Option<u64>) -> Result<&ProgressBar> {
        if self.bar.is_none() {
            let bar = match total {
                Some(total) => ProgressBar::new(total),
                None => ProgressBar::new_spinner(),
            };
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg:.bold.cyan}",
                )?
                .progress_chars("━━╌"),
            );
            bar.set_message("Downloading...");
            bar.enable_steady_tick(Duration::from_millis(120));
            self.bar = Some(bar);
        }
        self.bar
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("progress bar missing"))
    }
}

impl Default for BarRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for BarRenderer {
    fn render(&mut self, state: &ProgressState) -> Result<()> {
        match state.stage {
            Stage::Downloading => {
                let bar = self.bar_for(state.total_bytes)?;
                if let Some(total) = state.total_bytes {
                    bar.set_length(total);
                }
                bar.set_position(state.downloaded_bytes);
                bar.set_message(transfer_message(state));
            }
            Stage::Converting => {
                let bar = self.bar_for(None)?;
                bar.set_message("Converting...");
            }
            Stage::Finished => {
                // yt-dlp downloads video and audio separately; the next stream
                // gets a fresh bar
                if let Some(bar) = self.bar.take() {
                    if let Some(total) = state.total_bytes {
                        bar.set_length(total);
                        bar.set_position(total);
                    }
                    bar.finish_with_message("Done");
                }
            }
        }
        Ok(())
    }
}

/// Speed and ETA as yt-dlp measured them
fn transfer_message(state: &ProgressState) -> String {
    let mut message = String::from("Downloading...");
    if let Some(speed) = state.speed {
        message.push_str(&format!(" @ {}/s", format_bytes(speed as u64)));
    }
    if let Some(eta) = state.eta {
        message.push_str(&format!(" ETA {}", format_duration(eta)));
    }
    message
}

impl Drop for BarRenderer {
    fn drop(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.abandon();
        }
    }
}
