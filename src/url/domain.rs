use url::Url;

/// Query-string markers that make an extensionless URL a download candidate
const DOWNLOAD_MARKERS: &[&str] = &["format=pdf", "format=doc", "download=1"];

/// Extracts the lowercase host from a URL
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sitegraph::url::extract_domain;
///
/// let url = Url::parse("https://WWW.Example.EDU:8080/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.example.edu".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Returns the lowercase extension (with leading dot) of the last path segment
///
/// Only the final dot counts, and a segment that merely starts with a dot has
/// no extension: `report.tar.gz` yields `.gz`, `.profile` yields nothing.
pub fn path_extension(url: &Url) -> Option<String> {
    let segment = url.path().rsplit('/').next().unwrap_or("");
    let stem = segment.trim_start_matches('.');
    let dot = stem.rfind('.')?;
    let ext = &stem[dot..];
    if ext.len() <= 1 {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Whether the query string carries an explicit download marker
pub fn has_download_marker(url: &Url) -> bool {
    url.query()
        .map(|q| q.to_lowercase())
        .is_some_and(|q| DOWNLOAD_MARKERS.iter().any(|m| q.contains(m)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    #[test]
    fn test_extract_domain_lowercases_and_drops_port() {
        assert_eq!(
            extract_domain(&url("https://Example.EDU:8080/")),
            Some("example.edu".to_string())
        );
    }

    #[test]
    fn test_extract_domain_without_host() {
        assert_eq!(extract_domain(&url("mailto:a@example.edu")), None);
    }

    #[test]
    fn test_path_extension() {
        assert_eq!(
            path_extension(&url("https://example.edu/docs/Guide.PDF")),
            Some(".pdf".to_string())
        );
        assert_eq!(
            path_extension(&url("https://example.edu/a/report.tar.gz?x=1")),
            Some(".gz".to_string())
        );
    }

    #[test]
    fn test_path_extension_absent() {
        assert_eq!(path_extension(&url("https://example.edu")), None);
        assert_eq!(path_extension(&url("https://example.edu/about")), None);
        assert_eq!(path_extension(&url("https://example.edu/dir.d/")), None);
        assert_eq!(path_extension(&url("https://example.edu/.profile")), None);
        assert_eq!(path_extension(&url("https://example.edu/trailing.")), None);
    }

    #[test]
    fn test_download_marker() {
        assert!(has_download_marker(&url("https://example.edu/f?Format=PDF")));
        assert!(has_download_marker(&url("https://example.edu/f?id=3&download=1")));
        assert!(!has_download_marker(&url("https://example.edu/f?format=html")));
        assert!(!has_download_marker(&url("https://example.edu/f")));
    }
}
