//! Canonical hierarchical keys
//!
//! A `PathKey` is either the root marker `/` or a non-empty slash separated
//! path without leading or trailing slashes. Full URLs are reduced to their
//! path component.

use crate::error::{ImportError, ImportResult};
use once_cell::sync::OnceCell;
use std::hash::{Hash, Hasher};
use url::Url;

const ROOT: &str = "/";

#[derive(Debug, Clone)]
pub struct PathKey {
    path: String,
    segments: OnceCell<Vec<String>>,
}

impl PathKey {
    /// Normalize a raw path or URL
    pub fn parse(raw: &str) -> ImportResult<Self> {
        let raw = raw.trim();

        let path = match Url::parse(raw) {
            Ok(url) if url.has_host() => {
                if url.path().is_empty() || !has_explicit_path(raw) {
                    return Err(ImportError::InvalidInput(format!(
                        "URL has no path: {}",
                        raw
                    )));
                }
                url.path().to_string()
            }
            _ => raw.to_string(),
        };

        let path = if path == ROOT {
            path
        } else {
            path.trim_matches('/').to_string()
        };

        if path.is_empty() {
            return Err(ImportError::InvalidInput(format!(
                "path is empty or invalid: {:?}",
                raw
            )));
        }

        Ok(Self {
            path,
            segments: OnceCell::new(),
        })
    }

    pub fn root() -> Self {
        Self {
            path: ROOT.to_string(),
            segments: OnceCell::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.path == ROOT
    }

    /// Ordered segments; the root has the single segment `/`
    pub fn segments(&self) -> &[String] {
        self.segments.get_or_init(|| {
            if self.is_root() {
                vec![ROOT.to_string()]
            } else {
                self.path
                    .split('/')
                    .filter(|segment| !segment.is_empty())
                    .map(str::to_string)
                    .collect()
            }
        })
    }

    pub fn last_segment(&self) -> &str {
        self.segments().last().map(String::as_str).unwrap_or(ROOT)
    }

    /// The path without its last segment, for paths of two or more segments
    pub fn parent(&self) -> Option<PathKey> {
        let segments = self.segments();
        if self.is_root() || segments.len() < 2 {
            return None;
        }

        Some(Self {
            path: segments[..segments.len() - 1].join("/"),
            segments: OnceCell::new(),
        })
    }

    /// Strip `prefix` when it is exactly the first segment
    ///
    /// The root and prefix-less content types are returned unchanged. A path
    /// consisting only of the prefix yields an empty string.
    pub fn remove_prefix(&self, prefix: Option<&str>) -> String {
        let prefix = match prefix {
            Some(prefix) if !prefix.is_empty() && !self.is_root() => prefix,
            _ => return self.path.clone(),
        };

        let segments = self.segments();
        if segments.first().map(String::as_str) == Some(prefix) {
            segments[1..].join("/")
        } else {
            self.path.clone()
        }
    }
}

impl PartialEq for PathKey {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for PathKey {}

impl Hash for PathKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

impl std::fmt::Display for PathKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path)
    }
}

impl std::str::FromStr for PathKey {
    type Err = ImportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Whether the text after `scheme://authority` starts with a `/`
///
/// `Url` normalizes `https://example.com` to the path `/`, which would
/// otherwise read as the root.
fn has_explicit_path(raw: &str) -> bool {
    let rest = match raw.find("://") {
        Some(index) => &raw[index + 3..],
        None => return true,
    };
    rest.find(&['/', '?', '#'][..])
        .map_or(false, |index| rest[index..].starts_with('/'))
}
