// URL canonicalization and cheap pre-fetch filters.
//
// Apart from `canonicalize`, these work on the raw string rather than a
// parsed `Url`, so malformed input passes through.

use url::Url;

/// Extensions that never lead to readable HTML.
pub const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".zip", ".mp4", ".mp3", ".avi", ".doc",
    ".docx", ".xls", ".xlsx",
];

/// Drop the fragment from a URL. Everything before the first `#` is kept as-is.
pub fn normalize(url: &str) -> String {
    match url.find('#') {
        Some(idx) => url[..idx].to_string(),
        None => url.to_string(),
    }
}

/// Parse and re-serialize an absolute URL, then drop its fragment. The host
/// is lowercased and an empty path becomes `/`, matching how `Url::join`
/// spells resolved links. `None` if the URL does not parse.
pub fn canonicalize(url: &str) -> Option<String> {
    Url::parse(url.trim()).ok().map(|url| normalize(url.as_str()))
}

/// The `host[:port]` part of a URL, or an empty string if it has none.
pub fn network_location(url: &str) -> &str {
    let Some(scheme_end) = url.find("://") else {
        return "";
    };
    let rest = &url[scheme_end + 3..];
    let authority = rest
        .find(['/', '?', '#'])
        .map(|idx| &rest[..idx])
        .unwrap_or(rest);

    // userinfo is not part of the location
    match authority.rfind('@') {
        Some(idx) => &authority[idx + 1..],
        None => authority,
    }
}

/// Exact comparison of network locations, no subdomain folding.
pub fn is_same_domain(root: &str, candidate: &str) -> bool {
    network_location(root) == network_location(candidate)
}

pub fn should_skip(url: &str) -> bool {
    let lowered = url.to_lowercase();
    SKIP_EXTENSIONS.iter().any(|ext| lowered.ends_with(ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonicalize_matches_resolved_links() {
        assert_eq!(
            canonicalize("https://EXAMPLE.com/a#top").as_deref(),
            Some("https://example.com/a")
        );
        assert_eq!(
            canonicalize("https://example.com").as_deref(),
            Some("https://example.com/")
        );
        assert_eq!(canonicalize("/relative/path"), None);
    }

    #[test]
    fn test_normalize_strips_fragment() {
        assert_eq!(
            normalize("https://example.com/docs#install"),
            "https://example.com/docs"
        );
        assert_eq!(normalize("https://example.com/docs#"), "https://example.com/docs");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let urls = [
            "https://example.com/a?b=c#d",
            "https://Example.COM/Path",
            "not a url # at all",
            "",
            "#only-fragment",
        ];
        for url in urls {
            let once = normalize(url);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {url:?}");
        }
    }

    #[test]
    fn test_normalize_fragment_variants_collapse() {
        assert_eq!(
            normalize("https://example.com/page#top"),
            normalize("https://example.com/page#bottom")
        );
    }

    #[test]
    fn test_normalize_preserves_case_and_query() {
        assert_eq!(
            normalize("https://Example.com/Some/Path?Q=1"),
            "https://Example.com/Some/Path?Q=1"
        );
    }

    #[test]
    fn test_normalize_malformed_passes_through() {
        assert_eq!(normalize("::not-a-url::"), "::not-a-url::");
    }

    #[test]
    fn test_network_location() {
        assert_eq!(network_location("https://example.com/a/b"), "example.com");
        assert_eq!(network_location("http://localhost:8080"), "localhost:8080");
        assert_eq!(network_location("https://user:pw@example.com/"), "example.com");
        assert_eq!(network_location("https://example.com?x=1"), "example.com");
        assert_eq!(network_location("/relative/path"), "");
    }

    #[test]
    fn test_same_domain_exact_match_only() {
        assert!(is_same_domain("https://example.com/", "https://example.com/about"));
        assert!(!is_same_domain("https://example.com/", "https://blog.example.com/"));
        assert!(!is_same_domain("http://localhost:8080/", "http://localhost:9090/"));
        // scheme does not matter, only the location
        assert!(is_same_domain("http://example.com/", "https://example.com/x"));
    }

    #[test]
    fn test_should_skip_extensions_case_insensitive() {
        assert!(should_skip("https://example.com/report.PDF"));
        assert!(should_skip("https://example.com/photo.jpg"));
        assert!(should_skip("https://example.com/archive.zip"));
        assert!(should_skip("https://example.com/sheet.XLSX"));
        assert!(!should_skip("https://example.com/about"));
        assert!(!should_skip("https://example.com/pdf-guide"));
    }
}
