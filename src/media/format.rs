use crate::platform::{Platform, DEFAULT_FORMAT};

/// Builds the yt-dlp format selector for a download.
///
/// Without a height limit this is the platform's own preference. With one,
/// every `/`-separated alternative gets a `[height<=?N]` filter; the `?` keeps
/// formats whose height is unknown, which is common outside YouTube.
pub fn format_selector(platform: Option<&Platform>, max_height: Option<u32>) -> String {
    let preference = platform.map_or(DEFAULT_FORMAT, |p| p.format_preference);

    let Some(height) = max_height else {
        return preference.to_string();
    };

    preference
        .split('/')
        .map(|alternative| {
            alternative
                .split('+')
                .map(|stream| bound_stream(stream, height))
                .collect::<Vec<_>>()
                .join("+")
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn bound_stream(stream: &str, height: u32) -> String {
    // Audio-only streams have no height
    if stream.starts_with("bestaudio") || stream.starts_with("worstaudio") {
        return stream.to_string();
    }
    format!("{stream}[height<=?{height}]")
}
