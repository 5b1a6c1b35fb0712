use super::{list_platforms, Platform};
use tracing::debug;
use url::Url;

/// Finds the platform serving `url`, or `None` when no platform claims its host.
///
/// URLs pasted without a scheme (`youtu.be/abc`) are retried with `https://`.
/// A host matches a platform domain when it is the domain itself or one of its
/// subdomains; the first platform in registry order wins.
pub fn classify(url: &str) -> Option<&'static Platform> {
    let host = host_of(url.trim())?;

    let platform = list_platforms().iter().find(|platform| {
        platform
            .domains
            .iter()
            .any(|domain| host_matches(&host, domain))
    });

    debug!(
        "Classified {} as {}",
        url,
        platform.map(|p| p.id).unwrap_or("unknown")
    );
    platform
}

fn host_of(url: &str) -> Option<String> {
    if url.is_empty() {
        return None;
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some() => parsed,
        _ => Url::parse(&format!("https://{url}")).ok()?,
    };

    let host = parsed.host_str()?.trim_end_matches('.').to_lowercase();
    // A bare word like "not" parses as a host; real hosts have a dot
    host.contains('.').then_some(host)
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}
