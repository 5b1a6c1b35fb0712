use crate::media::DownloadError;
use std::{collections::BTreeMap, path::PathBuf, time::Duration};
use time::OffsetDateTime;

/// Platform id used in summaries for URLs no platform claimed
pub const UNKNOWN_PLATFORM: &str = "unknown";

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Success { file: Option<PathBuf> },
    Failure(DownloadError),
}

/// Outcome of one download attempt, kept for the rest of the session.
#[derive(Debug, Clone)]
pub struct DownloadRecord {
    pub url: String,
    pub platform: Option<&'static str>,
    pub title: Option<String>,
    pub outcome: Outcome,
    pub timestamp: OffsetDateTime,
    pub elapsed: Duration,
}

impl DownloadRecord {
    pub fn new(
        url: &str,
        platform: Option<&'static str>,
        outcome: Outcome,
        elapsed: Duration,
    ) -> Self {
        Self {
            url: url.to_string(),
            platform,
            title: None,
            outcome,
            timestamp: OffsetDateTime::now_utc(),
            elapsed,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }

    pub fn platform_id(&self) -> &'static str {
        self.platform.unwrap_or(UNKNOWN_PLATFORM)
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub by_platform: BTreeMap<&'static str, usize>,
}

/// Append-only log of this run's download attempts.
#[derive(Debug, Default)]
pub struct SessionHistory {
    entries: Vec<DownloadRecord>,
}

impl SessionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, entry: DownloadRecord) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[DownloadRecord] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            summary.total += 1;
            if entry.is_success() {
                summary.succeeded += 1;
            } else {
                summary.failed += 1;
            }
            *summary.by_platform.entry(entry.platform_id()).or_default() += 1;
        }
        summary
    }
}
