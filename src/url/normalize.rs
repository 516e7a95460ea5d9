use crate::{UrlError, UrlResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use url::{ParseError, Url};

/// A URL in its single comparable form
///
/// Produced only by [`canonicalize`] (or deserialized from output this crate wrote),
/// so two pages are the same page exactly when their `CanonicalUrl`s are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalUrl(String);

impl CanonicalUrl {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Re-parses the canonical form into a [`Url`]
    pub fn parse(&self) -> UrlResult<Url> {
        Url::parse(&self.0).map_err(|e| UrlError::Parse(format!("{}: {}", self.0, e)))
    }

    /// Returns the lowercase host, if the URL has one
    pub fn host(&self) -> Option<String> {
        self.parse().ok().as_ref().and_then(super::extract_domain)
    }
}

impl fmt::Display for CanonicalUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CanonicalUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CanonicalUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonicalizes a URL, optionally resolving it against a base URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Resolve against `base` when given (an empty reference resolves to the base)
/// 3. Default a missing scheme to `https`
/// 4. Remove the fragment
/// 5. Remove trailing slashes
///
/// The operation is idempotent: canonicalizing a canonical URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use sitegraph::url::canonicalize;
///
/// let url = canonicalize("HTTPS://Example.EDU/about/#team", None).unwrap();
/// assert_eq!(url.as_str(), "https://example.edu/about");
///
/// let url = canonicalize("example.edu/news", None).unwrap();
/// assert_eq!(url.as_str(), "https://example.edu/news");
/// ```
pub fn canonicalize(raw: &str, base: Option<&Url>) -> UrlResult<CanonicalUrl> {
    let raw = raw.trim();
    if raw.is_empty() && base.is_none() {
        return Err(UrlError::Empty);
    }

    let parsed = match base {
        Some(base) => base.join(raw),
        None => Url::parse(raw),
    };

    let mut url = parsed
        .or_else(|e| match e {
            ParseError::RelativeUrlWithoutBase => {
                Url::parse(&format!("https://{}", raw.trim_start_matches('/')))
            }
            other => Err(other),
        })
        .map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    url.set_fragment(None);

    let canonical = url.as_str().trim_end_matches('/');
    if canonical.is_empty() {
        return Err(UrlError::Empty);
    }

    Ok(CanonicalUrl(canonical.to_string()))
}
