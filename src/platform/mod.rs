mod classify;

pub use classify::classify;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Unknown platform: {0}")]
    NotFound(String),
}

#[derive(Debug, PartialEq, Eq)]
pub struct Platform {
    pub id: &'static str,
    pub display_name: &'static str,
    pub icon: &'static str,
    /// Hosts this platform serves videos from, matched as host suffixes
    pub domains: &'static [&'static str],
    pub examples: &'static [&'static str],
    /// yt-dlp format selector used when no height limit applies
    pub format_preference: &'static str,
}

/// Unknown platforms get whatever yt-dlp considers best
pub const DEFAULT_FORMAT: &str = "best";

static PLATFORMS: [Platform; 5] = [
    Platform {
        id: "youtube",
        display_name: "YouTube",
        icon: "🎬",
        domains: &["youtube.com", "youtu.be"],
        examples: &[
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/xxxxxxxxxxx",
        ],
        format_preference: "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best",
    },
    Platform {
        id: "instagram",
        display_name: "Instagram",
        icon: "📸",
        domains: &["instagram.com"],
        examples: &[
            "https://www.instagram.com/reel/CxxxxxXXXXX/",
            "https://www.instagram.com/p/CxxxxxXXXXX/",
            "https://www.instagram.com/tv/CxxxxxXXXXX/",
        ],
        format_preference: DEFAULT_FORMAT,
    },
    Platform {
        id: "facebook",
        display_name: "Facebook",
        icon: "👥",
        domains: &["facebook.com", "fb.watch"],
        examples: &[
            "https://www.facebook.com/watch?v=1234567890",
            "https://fb.watch/xxxxxxxxxxx/",
            "https://www.facebook.com/username/videos/1234567890",
        ],
        format_preference: DEFAULT_FORMAT,
    },
    Platform {
        id: "twitter",
        display_name: "Twitter/X",
        icon: "🐦",
        domains: &["twitter.com", "x.com"],
        examples: &[
            "https://twitter.com/username/status/1234567890",
            "https://x.com/username/status/1234567890",
        ],
        format_preference: DEFAULT_FORMAT,
    },
    Platform {
        id: "pinterest",
        display_name: "Pinterest",
        icon: "📌",
        domains: &["pinterest.com", "pin.it"],
        examples: &["https://www.pinterest.com/pin/1234567890/"],
        format_preference: DEFAULT_FORMAT,
    },
];

/// All supported platforms, in menu order.
pub fn list_platforms() -> &'static [Platform] {
    &PLATFORMS
}

/// Looks a platform up by its id.
pub fn get(id: &str) -> Result<&'static Platform, PlatformError> {
    PLATFORMS
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| PlatformError::NotFound(id.to_string()))
}

/// Maps a 1-based menu number to its platform.
pub fn by_menu_key(key: usize) -> Option<&'static Platform> {
    key.checked_sub(1).and_then(|index| PLATFORMS.get(index))
}
