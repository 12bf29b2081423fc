use lazy_static::lazy_static;
use regex::Regex;

use super::types::RuleKind;

lazy_static! {
    /// RFC 3986 scheme: a letter followed by letters, digits, `+`, `-` or `.`.
    static ref SCHEME_PATTERN: Regex =
        Regex::new(r"^[a-zA-Z][a-zA-Z0-9+\-.]*$").expect("scheme pattern compiles");
}

/// Decide whether a rule string is a filesystem path or a URL scheme.
pub fn classify(path: &str) -> RuleKind {
    if path.starts_with('/') {
        return RuleKind::FilePath;
    }

    match url_scheme(path) {
        Some(scheme) if path.contains("://") && SCHEME_PATTERN.is_match(scheme) => {
            RuleKind::UrlScheme
        }
        _ => RuleKind::Unclassifiable,
    }
}

/// Scheme component of something that parses as a URL.
///
/// Strings with whitespace or control characters are not URLs at all.
pub(crate) fn url_scheme(candidate: &str) -> Option<&str> {
    if candidate
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return None;
    }
    let (scheme, _) = candidate.split_once(':')?;
    if scheme.is_empty() {
        None
    } else {
        Some(scheme)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_paths_are_file_paths() {
        assert_eq!(classify("/var/mobile/Library/Filza"), RuleKind::FilePath);
        assert_eq!(classify("/"), RuleKind::FilePath);
        // A leading slash wins even when the rest looks like a URL.
        assert_eq!(classify("/tmp/http://x"), RuleKind::FilePath);
    }

    #[test]
    fn schemed_urls_are_url_schemes() {
        assert_eq!(classify("Filza://"), RuleKind::UrlScheme);
        assert_eq!(classify("x-web-search+v1.0://query"), RuleKind::UrlScheme);
        assert_eq!(classify("https://example.com/a"), RuleKind::UrlScheme);
    }

    #[test]
    fn malformed_candidates_are_unclassifiable() {
        assert_eq!(classify("Filza"), RuleKind::Unclassifiable);
        assert_eq!(classify("Filza:"), RuleKind::Unclassifiable);
        assert_eq!(classify("mailto:someone@example.com"), RuleKind::Unclassifiable);
        assert_eq!(classify("1filza://"), RuleKind::Unclassifiable);
        assert_eq!(classify("fil_za://"), RuleKind::Unclassifiable);
        assert_eq!(classify("://nothing"), RuleKind::Unclassifiable);
        assert_eq!(classify("my app://"), RuleKind::Unclassifiable);
        assert_eq!(classify("var/mobile/Library"), RuleKind::Unclassifiable);
    }

    #[test]
    fn url_scheme_extracts_leading_component() {
        assert_eq!(url_scheme("Filza://"), Some("Filza"));
        assert_eq!(url_scheme("a:b"), Some("a"));
        assert_eq!(url_scheme("noscheme"), None);
        assert_eq!(url_scheme(":x"), None);
        assert_eq!(url_scheme("tab\there://"), None);
    }
}
