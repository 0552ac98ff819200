use crate::{UrlError, UrlResult};
use std::fmt;
use url::Url;

/// Tracking query parameters removed during normalization
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid"];

/// A canonical absolute URL
///
/// Two links that point at the same target produce equal `NormalizedUrl`
/// values, so this is the key used for frontier and visited-set dedup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NormalizedUrl(Url);

impl NormalizedUrl {
    /// The canonical string form
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Borrow the underlying parsed URL
    pub fn as_url(&self) -> &Url {
        &self.0
    }

    /// The lowercase host
    pub fn host(&self) -> &str {
        // normalize() rejects URLs without a host
        self.0.host_str().unwrap_or_default()
    }

    /// The explicit port, or the scheme's default port
    pub fn port(&self) -> Option<u16> {
        self.0.port_or_known_default()
    }

    /// The percent-encoded path
    pub fn path(&self) -> &str {
        self.0.path()
    }

    /// `scheme://host[:port]`, the key for per-server state such as robots rules
    pub fn origin(&self) -> String {
        match self.0.port() {
            Some(port) => format!("{}://{}:{}", self.0.scheme(), self.host(), port),
            None => format!("{}://{}", self.0.scheme(), self.host()),
        }
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl AsRef<str> for NormalizedUrl {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Normalizes a URL, resolving it against `base` when it is relative
///
/// # Normalization Steps
///
/// 1. Resolve against `base` (or parse as absolute); reject if malformed
/// 2. Reject schemes other than http/https
/// 3. Lowercase scheme and host, drop the default port
/// 4. Remove the fragment
/// 5. Collapse duplicate slashes and drop a trailing `index.html`
/// 6. Remove tracking query parameters, sort the rest, drop an empty query
///
/// The result is idempotent: normalizing a normalized URL returns it unchanged.
///
/// # Examples
///
/// ```
/// use glean::url::normalize;
///
/// let a = normalize("HTTP://Example.COM:80//docs/index.html#intro", None).unwrap();
/// assert_eq!(a.as_str(), "http://example.com/docs/");
///
/// let base = url::Url::parse("https://example.com/guide/").unwrap();
/// let b = normalize("../about", Some(&base)).unwrap();
/// assert_eq!(b.as_str(), "https://example.com/about");
/// ```
pub fn normalize(url_str: &str, base: Option<&Url>) -> UrlResult<NormalizedUrl> {
    let url_str = url_str.trim();
    let parsed = match base {
        Some(base) => base.join(url_str),
        None => Url::parse(url_str),
    };
    let mut url = parsed.map_err(|e| UrlError::Parse(format!("{}: {}", url_str, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    // The WHATWG parser already lowercases scheme and host for special schemes
    // and omits default ports; only the host presence needs checking here.
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }
    if url.port().is_some() && url.port() == default_port(url.scheme()) {
        // set_port only fails for URLs that cannot carry a port
        let _ = url.set_port(None);
    }

    url.set_fragment(None);

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(NormalizedUrl(url))
}

fn default_port(scheme: &str) -> Option<u16> {
    match scheme {
        "http" => Some(80),
        "https" => Some(443),
        _ => None,
    }
}

/// Collapses duplicate slashes and strips a trailing `index.html` segment
fn normalize_path(path: &str) -> String {
    let mut collapsed = String::with_capacity(path.len() + 1);
    for ch in path.chars() {
        if ch == '/' && collapsed.ends_with('/') {
            continue;
        }
        collapsed.push(ch);
    }

    if !collapsed.starts_with('/') {
        collapsed.insert(0, '/');
    }

    if let Some(dir) = collapsed.strip_suffix("index.html") {
        if dir.ends_with('/') {
            collapsed.truncate(dir.len());
        }
    }

    collapsed
}

/// Filters out tracking parameters and sorts the remaining ones by key
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    // Stable sort keeps repeated keys in their original order
    params.sort_by(|a, b| a.0.cmp(&b.0));
    params
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
