use crate::platform::Platform;
use serde::Deserialize;
use std::{path::PathBuf, time::Duration};

/// What yt-dlp reports about a video before downloading it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MediaMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub uploader: Option<String>,
    /// Seconds
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub view_count: Option<u64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
    /// `YYYYMMDD`, as yt-dlp prints it
    #[serde(default)]
    pub upload_date: Option<String>,
}

impl MediaMetadata {
    /// Exact size when known, otherwise yt-dlp's estimate
    pub fn size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }

    /// Play time, when yt-dlp reported one that fits in a `Duration`
    pub fn length(&self) -> Option<Duration> {
        self.duration
            .filter(|secs| *secs > 0.0)
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }
}

#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub url: String,
    pub platform: Option<&'static Platform>,
    pub output_dir: PathBuf,
    /// Upper bound on video height in pixels
    pub max_height: Option<u32>,
}

/// Arguments handed to the backend for one transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOptions {
    pub output_template: PathBuf,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    /// Final path of the media file, when the backend reported it
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_from_ytdlp_json() {
        let json = r#"{"title": "Clip", "duration": 212.5, "filesize": null,
            "filesize_approx": 2048, "upload_date": "20240131", "extra": [1, 2]}"#;
        let metadata: MediaMetadata = serde_json::from_str(json).unwrap();

        assert_eq!(metadata.title.as_deref(), Some("Clip"));
        assert_eq!(metadata.size(), Some(2048));
        assert_eq!(metadata.length(), Some(Duration::from_secs_f64(212.5)));
        assert_eq!(metadata.uploader, None);
    }

    #[test]
    fn test_length_ignores_unusable_durations() {
        let with = |duration| MediaMetadata {
            duration: Some(duration),
            ..Default::default()
        };
        assert_eq!(with(1e23).length(), None);
        assert_eq!(with(0.0).length(), None);
        assert_eq!(with(-5.0).length(), None);
        assert_eq!(with(f64::NAN).length(), None);
        assert_eq!(MediaMetadata::default().length(), None);
    }
}
