use super::{
    progress::{ProgressState, Stage},
    DownloadError, DownloadOptions, DownloadedFile, Downloader, MediaMetadata, ProgressSink,
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Stands in for yt-dlp: fails with the queued errors first, then succeeds by
/// writing a small file into the output directory.
pub struct StubDownloader {
    failures: Mutex<Vec<DownloadError>>,
    /// Never return from `inspect` or `download`
    hang: bool,
    /// Format selectors of every download call, in order
    pub formats: Arc<Mutex<Vec<String>>>,
}

impl StubDownloader {
    pub fn new(mut failures: Vec<DownloadError>) -> Self {
        failures.reverse();
        Self {
            failures: Mutex::new(failures),
            hang: false,
            formats: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A backend stuck on the network.
    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::new(vec![])
        }
    }
}

#[async_trait]
impl Downloader for StubDownloader {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn inspect(&self, url: &str) -> Result<MediaMetadata, DownloadError> {
        if self.hang {
            std::future::pending::<()>().await;
        }
        if url.contains("private") {
            return Err(DownloadError::ContentUnavailable("Private video".to_string()));
        }
        Ok(MediaMetadata {
            title: Some("Stub video".to_string()),
            uploader: Some("Stub uploader".to_string()),
            duration: Some(212.0),
            view_count: Some(1_234_567),
            ..Default::default()
        })
    }

    async fn download(
        &self,
        _url: &str,
        options: &DownloadOptions,
        sink: &mut (dyn ProgressSink + Send),
    ) -> Result<DownloadedFile, DownloadError> {
        self.formats.lock().unwrap().push(options.format.clone());
        if let Some(err) = self.failures.lock().unwrap().pop() {
            return Err(err);
        }

        if self.hang {
            sink.on_progress(&ProgressState::stage(Stage::Downloading));
            std::future::pending::<()>().await;
        }

        for bytes in [0, 50, 100] {
            sink.on_progress(&ProgressState {
                downloaded_bytes: bytes,
                total_bytes: Some(100),
                speed: None,
                eta: None,
                stage: Stage::Downloading,
            });
        }

        let path = options.output_template.with_file_name("Stub video.mp4");
        std::fs::write(&path, b"video").map_err(|e| DownloadError::Filesystem(e.to_string()))?;
        Ok(DownloadedFile { path: Some(path) })
    }
}
