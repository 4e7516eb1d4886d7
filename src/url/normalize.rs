use crate::UrlError;
use url::Url;

/// List of tracking query parameters to remove during normalization
const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_term",
    "utm_content",
    "fbclid",
    "gclid",
    "mc_eid",
    "ref",
    "source",
];

/// Path extensions that never hold documentation text
const EXCLUDED_EXTENSIONS: &[&str] = &[
    "pdf", "zip", "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "css", "js", "json", "xml",
    "gz", "tar", "tgz", "exe", "dmg", "woff", "woff2", "ttf", "mp3", "mp4", "webm",
];

/// Normalizes a URL into the key used to deduplicate pages
///
/// # Normalization Steps
///
/// 1. Parse the URL; reject if malformed or not http, https or file
/// 2. Lowercase the host (the scheme is kept so the URL stays fetchable)
/// 3. Normalize path:
///    - Remove dot segments (. and ..) and repeated slashes
///    - Remove trailing slash (except for root /)
///    - Empty path becomes /
/// 4. Remove fragment (everything after #)
/// 5. Remove tracking query parameters and sort the remaining ones
/// 6. Remove empty query string (trailing ?)
///
/// `file://` URLs only lose their fragment and query.
///
/// # Examples
///
/// ```
/// use sumi_scribe::url::normalize_url;
///
/// let url = normalize_url("https://Docs.Example.COM/guide/?utm_source=x#intro").unwrap();
/// assert_eq!(url.as_str(), "https://docs.example.com/guide");
/// ```
pub fn normalize_url(url_str: &str) -> Result<Url, UrlError> {
    let mut url = Url::parse(url_str).map_err(|e| UrlError::Parse(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        "file" => {
            url.set_fragment(None);
            url.set_query(None);
            return Ok(url);
        }
        other => {
            return Err(UrlError::InvalidScheme(format!(
                "Only HTTP, HTTPS and file schemes are supported, got: {}",
                other
            )));
        }
    }

    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or(UrlError::MissingDomain)?
        .to_lowercase();
    url.set_host(Some(&host))
        .map_err(|e| UrlError::Malformed(format!("Failed to set host: {}", e)))?;

    let normalized_path = normalize_path(url.path());
    url.set_path(&normalized_path);

    url.set_fragment(None);

    if url.query().is_some() {
        let params = filter_and_sort_query_params(&url);
        if params.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(params);
        }
    }

    Ok(url)
}

/// Returns true for URLs whose path points at a binary or asset file
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::is_excluded_asset;
///
/// assert!(is_excluded_asset(&Url::parse("https://a.dev/logo.PNG").unwrap()));
/// assert!(!is_excluded_asset(&Url::parse("https://a.dev/guide.html").unwrap()));
/// ```
pub fn is_excluded_asset(url: &Url) -> bool {
    let last = url.path().rsplit('/').next().unwrap_or_default();
    match last.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => {
            let ext = ext.to_ascii_lowercase();
            EXCLUDED_EXTENSIONS.contains(&ext.as_str())
        }
        _ => false,
    }
}

/// Normalizes a URL path by removing dot segments and trailing slashes
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    if segments.is_empty() {
        return "/".to_string();
    }

    format!("/{}", segments.join("/"))
}

/// Filters out tracking parameters and sorts remaining query parameters
fn filter_and_sort_query_params(url: &Url) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !is_tracking_param(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    params.sort();
    params
}

fn is_tracking_param(key: &str) -> bool {
    TRACKING_PARAMS.contains(&key) || key.starts_with("utm_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_preserved() {
        let result = normalize_url("http://example.com/page").unwrap();
        assert_eq!(result.as_str(), "http://example.com/page");
    }

    #[test]
    fn test_www_is_preserved() {
        let result = normalize_url("https://www.example.com/").unwrap();
        assert_eq!(result.as_str(), "https://www.example.com/");
    }

    #[test]
    fn test_remove_trailing_slash() {
        let result = normalize_url("https://example.com/page/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_keep_root_slash() {
        let result = normalize_url("https://example.com/").unwrap();
        assert_eq!(result.as_str(), "https://example.com/");
    }

    #[test]
    fn test_remove_fragment() {
        let result = normalize_url("https://example.com/page#section").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_remove_tracking_params() {
        let result = normalize_url(
            "https://example.com/page?keep=yes&utm_medium=email&another=value&fbclid=123",
        )
        .unwrap();
        assert_eq!(
            result.as_str(),
            "https://example.com/page?another=value&keep=yes"
        );
    }

    #[test]
    fn test_all_tracking_params_removed() {
        let result =
            normalize_url("https://example.com/page?utm_source=a&fbclid=b&gclid=c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/page");
    }

    #[test]
    fn test_normalize_path_with_dots() {
        let result = normalize_url("https://example.com/a/../b/./c").unwrap();
        assert_eq!(result.as_str(), "https://example.com/b/c");
    }

    #[test]
    fn test_lowercase_domain_only() {
        let result = normalize_url("https://EXAMPLE.COM/Page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/Page");
    }

    #[test]
    fn test_multiple_slashes() {
        let result = normalize_url("https://example.com///path//to///page").unwrap();
        assert_eq!(result.as_str(), "https://example.com/path/to/page");
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let inputs = [
            "https://Example.com/a/../b/?z=1&a=2#top",
            "http://example.com:8080//docs/",
            "https://example.com",
        ];
        for input in inputs {
            let once = normalize_url(input).unwrap();
            let twice = normalize_url(once.as_str()).unwrap();
            assert_eq!(once, twice, "not idempotent for {}", input);
        }
    }

    #[test]
    fn test_file_url_keeps_path() {
        let result = normalize_url("file:///tmp/docs/Guide.md#part").unwrap();
        assert_eq!(result.as_str(), "file:///tmp/docs/Guide.md");
    }

    #[test]
    fn test_invalid_scheme() {
        let result = normalize_url("ftp://example.com/page");
        assert!(matches!(result.unwrap_err(), UrlError::InvalidScheme(_)));
    }

    #[test]
    fn test_malformed_url() {
        assert!(matches!(
            normalize_url("not a url"),
            Err(UrlError::Parse(_))
        ));
    }

    #[test]
    fn test_excluded_assets() {
        for path in ["a.pdf", "img/b.JPG", "c.tar", "bundle.js", "sitemap.xml"] {
            let url = Url::parse(&format!("https://example.com/{}", path)).unwrap();
            assert!(is_excluded_asset(&url), "{} should be excluded", path);
        }
        for path in ["", "guide", "guide.html", "v1.2/intro", ".well-known"] {
            let url = Url::parse(&format!("https://example.com/{}", path)).unwrap();
            assert!(!is_excluded_asset(&url), "{} should be kept", path);
        }
    }
}
