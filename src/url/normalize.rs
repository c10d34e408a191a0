use crate::UrlError;
use url::Url;

/// Link prefixes that never point at a fetchable page
const PSEUDO_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "sms:", "data:"];

fn is_pseudo_scheme(link: &str) -> bool {
    let lower = link.to_ascii_lowercase();
    PSEUDO_SCHEMES.iter().any(|scheme| lower.starts_with(scheme))
}

/// True when the text starts with `scheme://`
///
/// A `://` later in the path or query does not count.
fn has_leading_scheme(raw: &str) -> bool {
    let Some((scheme, rest)) = raw.split_once(':') else {
        return false;
    };

    let mut chars = scheme.chars();
    let valid_scheme = chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));

    valid_scheme && rest.starts_with("//")
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Resolves a raw link found on a page into an absolute, fragment-free URL
///
/// Links that cannot produce a fetchable HTTP(S) URL are dropped silently:
///
/// - empty or whitespace-only hrefs
/// - `javascript:`, `mailto:`, `tel:`, `sms:` and `data:` pseudo-schemes
/// - hrefs that fail to resolve against `base`
/// - any other non-HTTP(S) scheme after resolution
///
/// No other canonicalization happens: case, trailing slashes and query order
/// are kept as the `url` crate serializes them.
///
/// # Examples
///
/// ```
/// use linkprobe::url::normalize_link;
/// use url::Url;
///
/// let base = Url::parse("https://example.com/docs/").unwrap();
/// let url = normalize_link(&base, "guide.html#install").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/docs/guide.html");
///
/// assert!(normalize_link(&base, "mailto:someone@example.com").is_none());
/// ```
pub fn normalize_link(base: &Url, link: &str) -> Option<Url> {
    let link = link.trim();
    if link.is_empty() || is_pseudo_scheme(link) {
        return None;
    }

    let mut url = base.join(link).ok()?;
    url.set_fragment(None);

    if is_http(&url) {
        Some(url)
    } else {
        None
    }
}

/// Normalizes the seed URL a crawl (or a single check) starts from
///
/// A bare host such as `example.com/path` gets an `https://` scheme. Unlike
/// [`normalize_link`], failures are reported because a bad seed aborts the run.
///
/// # Examples
///
/// ```
/// use linkprobe::url::normalize_seed;
///
/// let url = normalize_seed("  example.com/start#top ").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/start");
/// ```
pub fn normalize_seed(raw: &str) -> Result<Url, UrlError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    if is_pseudo_scheme(raw) {
        return Err(UrlError::InvalidScheme(raw.to_string()));
    }

    let candidate = if has_leading_scheme(raw) {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(format!("{}: {}", raw, e)))?;

    if !is_http(&url) {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}
