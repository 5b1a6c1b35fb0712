mod downloader;
mod errors;
mod format;
mod progress;
mod types;
mod ytdlp;

#[cfg(test)]
pub(crate) mod testing;

pub use downloader::Downloader;
pub use errors::{DownloadError, FailureKind};
pub use format::format_selector;
pub use progress::{BarRenderer, ProgressReporter, ProgressSink};
pub use types::{DownloadOptions, DownloadRequest, DownloadedFile, MediaMetadata};
pub use ytdlp::YtDlpDownloader;

use crate::session::{DownloadRecord, Outcome};
use std::{future::Future, path::Path, pin::Pin, time::Instant};
use tracing::{info, warn};

const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// Resolves when the user asks to abandon the running backend call.
pub type Interrupt = fn() -> Pin<Box<dyn Future<Output = ()> + Send>>;

fn ctrl_c() -> Pin<Box<dyn Future<Output = ()> + Send>> {
    Box::pin(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    })
}

/// Runs one download at a time and turns every result into a `DownloadRecord`.
pub struct DownloadCoordinator {
    backend: Box<dyn Downloader>,
    interrupt: Interrupt,
}

impl DownloadCoordinator {
    pub fn new(backend: Box<dyn Downloader>) -> Self {
        info!("Download coordinator initialized with {}", backend.name());
        Self {
            backend,
            interrupt: ctrl_c,
        }
    }

    #[cfg(test)]
    pub fn with_interrupt(mut self, interrupt: Interrupt) -> Self {
        self.interrupt = interrupt;
        self
    }

    /// Fetches metadata. Ctrl-C abandons the lookup with `Cancelled`.
    pub async fn inspect(&self, url: &str) -> Result<MediaMetadata, DownloadError> {
        tokio::select! {
            result = self.backend.inspect(url) => result,
            () = (self.interrupt)() => {
                warn!("Metadata lookup for {} interrupted", url);
                Err(DownloadError::Cancelled)
            }
        }
    }

    /// Downloads `request` into its output directory.
    ///
    /// Never fails: directory errors, backend errors and Ctrl-C all end up as a
    /// failed record. Partial files from a failed or cancelled download are left
    /// for the backend to deal with.
    pub async fn download(
        &self,
        request: &DownloadRequest,
        sink: &mut (dyn ProgressSink + Send),
    ) -> DownloadRecord {
        let started = Instant::now();
        let platform = request.platform.map(|p| p.id);

        let outcome = match self.run(request, sink).await {
            Ok(file) => {
                info!("Downloaded {} to {:?}", request.url, file.path);
                Outcome::Success { file: file.path }
            }
            Err(e) => {
                warn!("Download of {} failed: {}", request.url, e);
                Outcome::Failure(e)
            }
        };

        DownloadRecord::new(&request.url, platform, outcome, started.elapsed())
    }

    async fn run(
        &self,
        request: &DownloadRequest,
        sink: &mut (dyn ProgressSink + Send),
    ) -> Result<DownloadedFile, DownloadError> {
        prepare_output_dir(&request.output_dir).await?;

        let options = DownloadOptions {
            output_template: request.output_dir.join(OUTPUT_TEMPLATE),
            format: format_selector(request.platform, request.max_height),
        };

        let result = tokio::select! {
            result = self.backend.download(&request.url, &options, &mut *sink) => result,
            () = (self.interrupt)() => {
                warn!("Download of {} interrupted", request.url);
                Err(DownloadError::Cancelled)
            }
        };
        sink.finish();
        result
    }
}

async fn prepare_output_dir(dir: &Path) -> Result<(), DownloadError> {
    tokio::fs::create_dir_all(dir).await.map_err(|e| {
        DownloadError::Filesystem(format!(
            "Failed to create output directory {}: {}",
            dir.display(),
            e
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::progress::ProgressState;
    use crate::{media::testing::StubDownloader, platform, session::SessionHistory};
    use std::path::PathBuf;

    #[derive(Default)]
    struct CountingSink {
        updates: usize,
        finished: bool,
    }

    impl ProgressSink for CountingSink {
        fn on_progress(&mut self, _state: &ProgressState) {
            self.updates += 1;
        }

        fn finish(&mut self) {
            self.finished = true;
        }
    }

    fn request(url: &str, output_dir: PathBuf) -> DownloadRequest {
        DownloadRequest {
            url: url.to_string(),
            platform: platform::classify(url),
            output_dir,
            max_height: None,
        }
    }

    #[tokio::test]
    async fn test_download_creates_missing_output_dir() {
        let temp = tempfile::tempdir().unwrap();
        let output_dir = temp.path().join("nested").join("downloads");
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::new(vec![])));
        let mut sink = CountingSink::default();

        let record = coordinator
            .download(&request("https://youtu.be/abc123", output_dir.clone()), &mut sink)
            .await;

        assert!(output_dir.is_dir());
        assert!(record.is_success(), "{:?}", record.outcome);
        assert_eq!(record.platform, Some("youtube"));
        assert_eq!(
            record.outcome,
            Outcome::Success {
                file: Some(output_dir.join("Stub video.mp4"))
            }
        );
        assert_eq!(sink.updates, 3);
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn test_unwritable_output_dir_is_a_filesystem_failure() {
        let temp = tempfile::tempdir().unwrap();
        let blocker = temp.path().join("not-a-dir");
        std::fs::write(&blocker, b"").unwrap();
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::new(vec![])));

        let record = coordinator
            .download(
                &request("https://youtu.be/abc123", blocker.join("downloads")),
                &mut CountingSink::default(),
            )
            .await;

        match record.outcome {
            Outcome::Failure(err) => assert_eq!(err.kind(), FailureKind::Filesystem),
            other => panic!("expected a filesystem failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backend_errors_become_records() {
        let temp = tempfile::tempdir().unwrap();
        let failure = DownloadError::classify("ERROR: Unsupported URL: not a url");
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::new(vec![failure])));
        let mut sink = CountingSink::default();

        let record = coordinator
            .download(&request("not a url", temp.path().to_path_buf()), &mut sink)
            .await;

        assert!(!record.is_success());
        assert_eq!(record.platform, None);
        assert!(sink.finished);
        match record.outcome {
            Outcome::Failure(err) => assert_eq!(err.kind(), FailureKind::UnsupportedUrl),
            other => panic!("expected a failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_three_attempts_summarised() {
        let temp = tempfile::tempdir().unwrap();
        let stub = StubDownloader::new(vec![DownloadError::ContentUnavailable(
            "Private video".to_string(),
        )]);
        let coordinator = DownloadCoordinator::new(Box::new(stub));
        let mut history = SessionHistory::new();

        // The stub fails the first call and succeeds afterwards
        for url in [
            "https://www.instagram.com/reel/xyz/",
            "https://youtu.be/abc123",
            "https://x.com/user/status/1",
        ] {
            let record = coordinator
                .download(
                    &request(url, temp.path().to_path_buf()),
                    &mut CountingSink::default(),
                )
                .await;
            history.record(record);
        }

        let summary = history.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 2);
        assert_eq!(summary.failed, 1);
        assert!(matches!(
            history.entries()[0].outcome,
            Outcome::Failure(DownloadError::ContentUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_max_height_reaches_the_backend() {
        let temp = tempfile::tempdir().unwrap();
        let stub = StubDownloader::new(vec![]);
        let formats = stub.formats.clone();
        let coordinator = DownloadCoordinator::new(Box::new(stub));
        let mut req = request("https://www.pinterest.com/pin/1/", temp.path().to_path_buf());
        req.max_height = Some(480);

        let record = coordinator
            .download(&req, &mut CountingSink::default())
            .await;

        assert!(record.is_success());
        assert_eq!(*formats.lock().unwrap(), ["best[height<=?480]"]);
    }

    fn interrupt_now() -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(std::future::ready(()))
    }

    #[tokio::test]
    async fn test_interrupted_download_is_cancelled() {
        let temp = tempfile::tempdir().unwrap();
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::hanging()))
            .with_interrupt(interrupt_now);
        let mut sink = CountingSink::default();

        let record = coordinator
            .download(&request("https://youtu.be/abc123", temp.path().to_path_buf()), &mut sink)
            .await;

        assert_eq!(record.outcome, Outcome::Failure(DownloadError::Cancelled));
        assert_eq!(record.platform, Some("youtube"));
        assert!(sink.finished);
    }

    #[tokio::test]
    async fn test_interrupted_inspect_is_cancelled() {
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::hanging()))
            .with_interrupt(interrupt_now);

        let err = coordinator.inspect("https://youtu.be/abc123").await.unwrap_err();
        assert_eq!(err.kind(), FailureKind::Cancelled);
    }

    #[tokio::test]
    async fn test_inspect_delegates_to_backend() {
        let coordinator = DownloadCoordinator::new(Box::new(StubDownloader::new(vec![])));
        let metadata = coordinator.inspect("https://youtu.be/abc123").await.unwrap();
        assert_eq!(metadata.title.as_deref(), Some("Stub video"));
    }
}
