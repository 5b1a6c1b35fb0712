use thiserror::Error;

/// Why a download attempt failed, as shown to the user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DownloadError {
    #[error("Network error: {0}")]
    Network(String),

    /// Private, removed, geo-blocked or login-gated content
    #[error("Content unavailable: {0}")]
    ContentUnavailable(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),

    #[error("Filesystem error: {0}")]
    Filesystem(String),

    #[error("Download cancelled")]
    Cancelled,

    #[error("Download failed: {0}")]
    Unknown(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FailureKind {
    Network,
    ContentUnavailable,
    UnsupportedUrl,
    Filesystem,
    Cancelled,
    Unknown,
}

const FILESYSTEM_MARKERS: &[&str] = &[
    "permission denied",
    "no space left",
    "read-only file system",
    "unable to open for writing",
    "unable to rename file",
    "file name too long",
];

const UNSUPPORTED_MARKERS: &[&str] = &[
    "unsupported url",
    "is not a valid url",
    "invalid url",
    "no such extractor",
];

const UNAVAILABLE_MARKERS: &[&str] = &[
    "private video",
    "video is private",
    "video unavailable",
    "is not available",
    "has been removed",
    "was removed",
    "been deleted",
    "not available in your country",
    "geo restrict",
    "geo-restrict",
    "login required",
    "sign in to confirm",
    "requires authentication",
    "members-only",
    "http error 403",
    "http error 404",
    "no video formats found",
    "there's no video in this",
];

const NETWORK_MARKERS: &[&str] = &[
    "unable to download webpage",
    "urlopen error",
    "timed out",
    "timeout",
    "connection refused",
    "connection reset",
    "network is unreachable",
    "temporary failure in name resolution",
    "name or service not known",
    "getaddrinfo failed",
    "failed to resolve",
    "http error 5",
    "[ssl:",
];

impl DownloadError {
    /// Sorts a backend error message into the failure taxonomy.
    ///
    /// Markers are checked in a fixed order (filesystem, unsupported URL,
    /// unavailable content, network) since yt-dlp messages often mention more
    /// than one symptom, e.g. a 404 reported through "Unable to download webpage".
    pub fn classify(message: &str) -> Self {
        let message = message.trim();
        let lower = message.to_lowercase();
        let detail = last_error_line(message);
        let has = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if has(FILESYSTEM_MARKERS) {
            Self::Filesystem(detail)
        } else if has(UNSUPPORTED_MARKERS) {
            Self::UnsupportedUrl(detail)
        } else if has(UNAVAILABLE_MARKERS) {
            Self::ContentUnavailable(detail)
        } else if has(NETWORK_MARKERS) {
            Self::Network(detail)
        } else {
            Self::Unknown(detail)
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) => FailureKind::Network,
            Self::ContentUnavailable(_) => FailureKind::ContentUnavailable,
            Self::UnsupportedUrl(_) => FailureKind::UnsupportedUrl,
            Self::Filesystem(_) => FailureKind::Filesystem,
            Self::Cancelled => FailureKind::Cancelled,
            Self::Unknown(_) => FailureKind::Unknown,
        }
    }

    /// One-line suggested fix shown under the error.
    pub fn hint(&self) -> &'static str {
        match self {
            Self::Network(_) => "Check your internet connection and try again.",
            Self::ContentUnavailable(_) => {
                "Make sure the video is public and still available in your region."
            }
            Self::UnsupportedUrl(_) => {
                "Copy the full video URL from your browser's address bar."
            }
            Self::Filesystem(_) => {
                "Check that the output directory is writable and the disk has free space."
            }
            Self::Cancelled => "Start the download again when you are ready.",
            Self::Unknown(_) => "Try updating yt-dlp: pip install -U yt-dlp",
        }
    }
}

/// yt-dlp prints warnings before the fatal line; the last `ERROR:` line is the
/// one worth showing.
fn last_error_line(message: &str) -> String {
    message
        .lines()
        .rev()
        .find(|line| line.trim_start().starts_with("ERROR:"))
        .or_else(|| message.lines().rev().find(|line| !line.trim().is_empty()))
        .map(|line| line.trim().trim_start_matches("ERROR:").trim().to_string())
        .unwrap_or_else(|| "no error output".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_network() {
        let err = DownloadError::classify(
            "ERROR: [youtube] abc: Unable to download webpage: <urlopen error [Errno -3] Temporary failure in name resolution>",
        );
        assert_eq!(err.kind(), FailureKind::Network);
    }

    #[test]
    fn test_classify_unavailable() {
        for message in [
            "ERROR: [youtube] abc: Private video. Sign in if you've been granted access",
            "ERROR: [youtube] abc: Video unavailable. This video has been removed by the uploader",
            "ERROR: [Instagram] xyz: Requested content is not available, rate-limit reached or login required",
            "ERROR: [twitter] 1: No video could be found in this tweet; HTTP Error 404: Not Found",
        ] {
            assert_eq!(
                DownloadError::classify(message).kind(),
                FailureKind::ContentUnavailable,
                "{message}"
            );
        }
    }

    #[test]
    fn test_classify_unsupported_url() {
        let err = DownloadError::classify("ERROR: Unsupported URL: https://example.com/page");
        assert_eq!(
            err,
            DownloadError::UnsupportedUrl("Unsupported URL: https://example.com/page".to_string())
        );
        let err = DownloadError::classify("ERROR: 'not a url' is not a valid URL.");
        assert_eq!(err.kind(), FailureKind::UnsupportedUrl);
    }

    #[test]
    fn test_classify_filesystem_wins_over_network() {
        let err = DownloadError::classify(
            "WARNING: connection reset, retrying\nERROR: unable to open for writing: [Errno 13] Permission denied: 'downloads/a.mp4'",
        );
        assert_eq!(err.kind(), FailureKind::Filesystem);
    }

    #[test]
    fn test_classify_unknown_keeps_last_error_line() {
        let err = DownloadError::classify(
            "WARNING: something odd\nERROR: Postprocessing: ffprobe not found\n",
        );
        assert_eq!(
            err,
            DownloadError::Unknown("Postprocessing: ffprobe not found".to_string())
        );
        assert_eq!(
            DownloadError::classify(""),
            DownloadError::Unknown("no error output".to_string())
        );
    }

    #[test]
    fn test_every_error_has_a_hint() {
        let errors = [
            DownloadError::Network(String::new()),
            DownloadError::ContentUnavailable(String::new()),
            DownloadError::UnsupportedUrl(String::new()),
            DownloadError::Filesystem(String::new()),
            DownloadError::Cancelled,
            DownloadError::Unknown(String::new()),
        ];
        for err in errors {
            assert!(!err.hint().is_empty());
        }
    }
}
