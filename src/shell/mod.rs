mod prompt;
mod ui;

pub use prompt::{Prompter, TerminalPrompter};

use crate::{
    config::Config,
    media::{BarRenderer, DownloadCoordinator, DownloadRequest, MediaMetadata, ProgressReporter},
    platform::{self, Platform},
    session::{DownloadRecord, Outcome, SessionHistory},
};
use indicatif::ProgressBar;
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Input problems the user can fix by trying again.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("URL does not belong to any supported platform: {0}")]
    UnclassifiedUrl(String),
}

#[derive(Debug)]
enum State {
    MainMenu,
    PlatformSelected(&'static Platform),
    AwaitingUrl(&'static Platform),
    Confirming(DownloadRequest),
    Downloading(DownloadRequest, MediaMetadata),
    ResultDisplayed,
    Exit,
}

pub struct Shell<P: Prompter> {
    coordinator: DownloadCoordinator,
    prompter: P,
    history: SessionHistory,
    output_dir: PathBuf,
    max_height: Option<u32>,
    progress_interval: Duration,
}

impl<P: Prompter> Shell<P> {
    pub fn new(coordinator: DownloadCoordinator, prompter: P, config: &Config) -> Self {
        Self {
            coordinator,
            prompter,
            history: SessionHistory::new(),
            output_dir: config.output_dir.clone(),
            max_height: config.max_height,
            progress_interval: config.progress_interval,
        }
    }

    /// Runs menus until the user quits, then prints the session summary.
    ///
    /// A prompt that cannot be answered (closed stdin, Ctrl-C at a menu) ends the
    /// session the same way as choosing Exit.
    pub async fn run(mut self) -> SessionHistory {
        ui::banner();

        let mut state = State::MainMenu;
        loop {
            state = match self.step(state).await {
                Ok(State::Exit) => break,
                Ok(next) => next,
                Err(e) => {
                    warn!("Prompt failed, ending session: {:#}", e);
                    break;
                }
            };
        }

        ui::statistics(&self.history);
        ui::goodbye();
        info!("Session finished: {:?}", self.history.summary());
        self.history
    }

    async fn step(&mut self, state: State) -> anyhow::Result<State> {
        debug!("Shell state: {:?}", state);

        let next = match state {
            State::MainMenu => {
                let platforms = platform::list_platforms();
                ui::platform_menu(platforms);
                let choice = self
                    .prompter
                    .number("🎯 Select a platform", platforms.len(), 1)?;
                match platform::by_menu_key(choice) {
                    Some(platform) => State::PlatformSelected(platform),
                    None => State::Exit,
                }
            }
            State::PlatformSelected(platform) => {
                ui::platform_guide(platform);
                State::AwaitingUrl(platform)
            }
            State::AwaitingUrl(selected) => {
                let url = self
                    .prompter
                    .text("🔗 Enter video URL (empty to go back)")?;
                self.check_url(url.trim(), selected)?
            }
            State::Confirming(request) => self.confirm(request).await?,
            State::Downloading(request, metadata) => {
                self.download(request, metadata).await;
                State::ResultDisplayed
            }
            State::ResultDisplayed => {
                if self.prompter.confirm("🔄 Download another video?", true)? {
                    State::MainMenu
                } else {
                    State::Exit
                }
            }
            State::Exit => State::Exit,
        };
        Ok(next)
    }

    /// Turns a typed URL into a request. An empty URL goes back to the menu and
    /// a URL the user doesn't stand by asks again.
    fn check_url(&mut self, url: &str, selected: &'static Platform) -> anyhow::Result<State> {
        if url.is_empty() {
            let error = InputError::InvalidInput("URL cannot be empty!".to_string());
            ui::invalid(&error.to_string());
            return Ok(State::MainMenu);
        }

        let platform = match platform::classify(url) {
            Some(detected) if detected.id != selected.id => {
                ui::warning(&format!(
                    "Warning: URL appears to be from {}, not {}",
                    detected.display_name, selected.display_name
                ));
                if !self.prompter.confirm("Continue anyway?", false)? {
                    return Ok(State::AwaitingUrl(selected));
                }
                detected
            }
            Some(detected) => detected,
            None => {
                ui::warning(&InputError::UnclassifiedUrl(url.to_string()).to_string());
                if !self.prompter.confirm("Proceed anyway?", false)? {
                    return Ok(State::AwaitingUrl(selected));
                }
                // Short links and mirrors: trust the user's choice
                selected
            }
        };

        Ok(State::Confirming(DownloadRequest {
            url: url.to_string(),
            platform: Some(platform),
            output_dir: self.output_dir.clone(),
            max_height: self.max_height,
        }))
    }

    async fn confirm(&mut self, request: DownloadRequest) -> anyhow::Result<State> {
        let spinner = ProgressBar::new_spinner();
        spinner.set_message("Fetching video information...");
        spinner.enable_steady_tick(Duration::from_millis(100));
        let started = Instant::now();
        let inspected = self.coordinator.inspect(&request.url).await;
        spinner.finish_and_clear();

        let metadata = match inspected {
            Ok(metadata) => metadata,
            Err(e) => {
                ui::failure(&e);
                self.history.record(DownloadRecord::new(
                    &request.url,
                    request.platform.map(|p| p.id),
                    Outcome::Failure(e),
                    started.elapsed(),
                ));
                return Ok(State::ResultDisplayed);
            }
        };

        ui::video_info(&metadata);
        if self.prompter.confirm("⬇️  Proceed with download?", true)? {
            Ok(State::Downloading(request, metadata))
        } else {
            ui::warning("Download cancelled by user");
            Ok(State::ResultDisplayed)
        }
    }

    async fn download(&mut self, request: DownloadRequest, metadata: MediaMetadata) {
        let mut reporter = ProgressReporter::new(BarRenderer::new(), self.progress_interval);
        let record = self
            .coordinator
            .download(&request, &mut reporter)
            .await
            .with_title(metadata.title);
        drop(reporter);

        match &record.outcome {
            Outcome::Success { file } => ui::success(&request.output_dir, file.as_deref()),
            Outcome::Failure(e) => ui::failure(e),
        }
        self.history.record(record);
    }
}
