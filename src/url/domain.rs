use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// File URLs and other host-less URLs return None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str()
        .filter(|h| !h.is_empty())
        .map(|h| h.to_lowercase())
}

/// Returns true when both URLs point at the same host and port
///
/// The scheme is ignored, so `http://docs.rs/a` and `https://docs.rs/b` are
/// the same site, while a different port or subdomain is not.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use sumi_scribe::url::same_site;
///
/// let root = Url::parse("https://docs.example.com/").unwrap();
/// let page = Url::parse("https://Docs.Example.com/guide").unwrap();
/// let other = Url::parse("https://example.com/guide").unwrap();
/// assert!(same_site(&root, &page));
/// assert!(!same_site(&root, &other));
/// ```
pub fn same_site(a: &Url, b: &Url) -> bool {
    match (extract_domain(a), extract_domain(b)) {
        (Some(ha), Some(hb)) => ha == hb && a.port() == b.port(),
        _ => false,
    }
}
