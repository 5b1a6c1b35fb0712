use super::{
    errors::DownloadError,
    progress::ProgressSink,
    types::{DownloadOptions, DownloadedFile, MediaMetadata},
};
use async_trait::async_trait;

#[async_trait]
pub trait Downloader: Send + Sync {
    /// Human-readable name of the downloader
    fn name(&self) -> &'static str;

    /// Fetch video metadata without downloading anything
    async fn inspect(&self, url: &str) -> Result<MediaMetadata, DownloadError>;

    /// Download the video at `url`, reporting progress to `sink` as it arrives
    async fn download(
        &self,
        url: &str,
        options: &DownloadOptions,
        sink: &mut (dyn ProgressSink + Send),
    ) -> Result<DownloadedFile, DownloadError>;
}
