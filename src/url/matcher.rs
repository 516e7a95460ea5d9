/// Checks if a host matches an allowed-domain pattern
///
/// Two kinds of pattern are supported:
/// 1. Exact match: `example.edu` matches only `example.edu`
/// 2. Wildcard match: `*.example.edu` matches `example.edu` and any subdomain of it
///
/// Both arguments are expected to be lowercase already.
///
/// # Examples
///
/// ```
/// use sitegraph::url::matches_wildcard;
///
/// assert!(matches_wildcard("www.example.edu", "www.example.edu"));
/// assert!(!matches_wildcard("www.example.edu", "example.edu"));
///
/// assert!(matches_wildcard("*.example.edu", "example.edu"));
/// assert!(matches_wildcard("*.example.edu", "news.cs.example.edu"));
/// assert!(!matches_wildcard("*.example.edu", "notexample.edu"));
/// ```
pub fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    match pattern.strip_prefix("*.") {
        Some(base) => {
            candidate == base
                || candidate
                    .strip_suffix(base)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        }
        None => candidate == pattern,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(matches_wildcard("example.edu", "example.edu"));
        assert!(matches_wildcard("www.example.edu", "www.example.edu"));
    }

    #[test]
    fn test_exact_does_not_cover_subdomains() {
        assert!(!matches_wildcard("example.edu", "www.example.edu"));
        assert!(!matches_wildcard("www.example.edu", "example.edu"));
    }

    #[test]
    fn test_wildcard_matches_bare_and_nested() {
        assert!(matches_wildcard("*.example.edu", "example.edu"));
        assert!(matches_wildcard("*.example.edu", "www.example.edu"));
        assert!(matches_wildcard("*.example.edu", "a.b.example.edu"));
    }

    #[test]
    fn test_wildcard_rejects_lookalikes() {
        assert!(!matches_wildcard("*.example.edu", "myexample.edu"));
        assert!(!matches_wildcard("*.example.edu", "example.edu.evil.org"));
        assert!(!matches_wildcard("*.example.edu", "example.org"));
    }

    #[test]
    fn test_empty_candidate() {
        assert!(!matches_wildcard("*.example.edu", ""));
        assert!(!matches_wildcard("example.edu", ""));
    }
}
