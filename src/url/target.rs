//! Normalization of the user-supplied target string.

use crate::{UrlError, UrlResult};
use std::fmt;
use std::path::{Path, PathBuf};
use url::Url;

/// What a generation run reads from: a website or a local file tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A remote site rooted at this URL
    Remote(Url),
    /// A local file or directory (absolute)
    Local(PathBuf),
}

impl Target {
    /// Turns a user string into a target
    ///
    /// Accepted forms:
    ///
    /// * absolute `http://` / `https://` URLs
    /// * bare domains such as `docs.example.com/guide` (`https` is assumed)
    /// * any of the above prefixed with `@`
    /// * `file://` URLs
    /// * absolute or relative filesystem paths
    ///
    /// Relative paths are resolved against the current directory. A path
    /// that does not exist is still accepted when it is written as a path
    /// (`/`, `./`, `../`, `~/`); resolution reports it as missing later.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_scribe::url::Target;
    ///
    /// let target = Target::parse("@docs.example.com").unwrap();
    /// assert_eq!(target.to_string(), "https://docs.example.com/");
    /// ```
    pub fn parse(input: &str) -> UrlResult<Self> {
        let trimmed = input.trim();
        let trimmed = trimmed.strip_prefix('@').unwrap_or(trimmed).trim();

        if trimmed.is_empty() {
            return Err(UrlError::Malformed("empty target".to_string()));
        }

        let lower = trimmed.to_ascii_lowercase();

        if lower.starts_with("file://") {
            let url = Url::parse(trimmed).map_err(|e| UrlError::Parse(e.to_string()))?;
            let path = url
                .to_file_path()
                .map_err(|_| UrlError::Malformed(format!("not a local file URL: {}", trimmed)))?;
            return Ok(Target::Local(path));
        }

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return remote(trimmed);
        }

        let as_path = Path::new(trimmed);
        if as_path.exists() || looks_like_path(trimmed) {
            return Ok(Target::Local(absolutize(as_path)));
        }

        if lower.contains("://") {
            let scheme = lower.split("://").next().unwrap_or_default();
            return Err(UrlError::InvalidScheme(scheme.to_string()));
        }

        remote(&format!("https://{}", trimmed))
    }

    /// Root URL of the target; local paths become `file://` URLs
    pub fn root_url(&self) -> UrlResult<Url> {
        match self {
            Target::Remote(url) => Ok(url.clone()),
            Target::Local(path) => Url::from_file_path(path)
                .map_err(|_| UrlError::Malformed(format!("invalid path: {}", path.display()))),
        }
    }

    /// Default site name: the host, or the directory/file name
    pub fn site_name(&self) -> String {
        match self {
            Target::Remote(url) => url.host_str().unwrap_or("site").to_string(),
            Target::Local(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string()),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Remote(url) => write!(f, "{}", url),
            Target::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

fn remote(raw: &str) -> UrlResult<Target> {
    let mut url = Url::parse(raw).map_err(|e| UrlError::Parse(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }
    url.set_fragment(None);
    if url.path().is_empty() {
        url.set_path("/");
    }
    Ok(Target::Remote(url))
}

fn looks_like_path(s: &str) -> bool {
    s.starts_with('/')
        || s.starts_with("./")
        || s.starts_with("../")
        || s.starts_with("~/")
        || s == "."
        || s == ".."
        || s.contains('\\')
}

fn absolutize(path: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(rest))
            .unwrap_or_else(|| path.to_path_buf()),
        Err(_) => path.to_path_buf(),
    };

    if let Ok(canonical) = expanded.canonicalize() {
        return canonical;
    }
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    }
}
