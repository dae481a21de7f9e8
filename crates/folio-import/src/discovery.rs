//! Directory walking for input files

use chrono::{DateTime, Utc};
use folio_import_types::{DiscoveredFile, FileDiscovery, ImportError, ImportResult};
use glob::{MatchOptions, Pattern};
use regex::Regex;
use std::path::Path;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// File name filter
///
/// `/.../` is a regular expression, anything else a case-insensitive glob.
enum NameFilter {
    Glob(Pattern),
    Regex(Regex),
}

impl NameFilter {
    fn parse(pattern: &str) -> ImportResult<Self> {
        let regex = pattern
            .strip_prefix('/')
            .and_then(|rest| rest.strip_suffix('/'))
            .filter(|body| !body.is_empty());

        match regex {
            Some(body) => Regex::new(body)
                .map(NameFilter::Regex)
                .map_err(|e| ImportError::Discovery(format!("invalid pattern {}: {}", pattern, e))),
            None => Pattern::new(pattern)
                .map(NameFilter::Glob)
                .map_err(|e| ImportError::Discovery(format!("invalid pattern {}: {}", pattern, e))),
        }
    }

    fn matches(&self, name: &str) -> bool {
        match self {
            NameFilter::Glob(pattern) => pattern.matches_with(
                name,
                MatchOptions {
                    case_sensitive: false,
                    require_literal_separator: false,
                    require_literal_leading_dot: false,
                },
            ),
            NameFilter::Regex(regex) => regex.is_match(name),
        }
    }
}

/// Recursive discovery with `walkdir`
///
/// Hidden entries (leading `.`) are skipped. Unreadable entries are logged
/// and skipped.
#[derive(Debug, Clone, Default)]
pub struct WalkDirDiscovery {
    max_depth: Option<usize>,
}

impl WalkDirDiscovery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    fn is_hidden(entry: &DirEntry) -> bool {
        entry.depth() > 0
            && entry
                .file_name()
                .to_str()
                .map(|name| name.starts_with('.'))
                .unwrap_or(false)
    }
}

impl FileDiscovery for WalkDirDiscovery {
    fn discover(
        &self,
        root: &Path,
        extensions: &[&str],
        pattern: Option<&str>,
    ) -> ImportResult<Vec<DiscoveredFile>> {
        if !root.is_dir() {
            return Err(ImportError::InvalidPath(format!(
                "{} is not a directory",
                root.display()
            )));
        }

        let filter = pattern
            .filter(|p| !p.trim().is_empty())
            .map(NameFilter::parse)
            .transpose()?;

        let walker = WalkDir::new(root)
            .follow_links(false)
            .max_depth(self.max_depth.unwrap_or(usize::MAX))
            .into_iter()
            .filter_entry(|e| !Self::is_hidden(e));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let Some(extension) = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_lowercase)
            else {
                continue;
            };
            if !extensions.iter().any(|ext| ext.eq_ignore_ascii_case(&extension)) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if let Some(filter) = &filter {
                if !filter.matches(&name) {
                    continue;
                }
            }

            let metadata = entry
                .metadata()
                .map_err(|e| ImportError::Discovery(format!("{}: {}", path.display(), e)))?;
            let modified = metadata
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());

            files.push(DiscoveredFile {
                path: path.to_path_buf(),
                name,
                extension,
                size: metadata.len(),
                modified,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Discovered {} files under {}", files.len(), root.display());
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("pages.csv"), "path\na\n").unwrap();
        fs::write(dir.path().join("Users.CSV"), "login\nana\n").unwrap();
        fs::write(dir.path().join("notes.md"), "# notes").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/terms.tsv"), "path\ttaxonomy\n").unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/old.csv"), "path\n").unwrap();
        dir
    }

    fn names(files: &[DiscoveredFile]) -> Vec<&str> {
        files.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_filters_by_extension_recursively_sorted_by_path() {
        let dir = tree();

        let files = WalkDirDiscovery::new()
            .discover(dir.path(), &["csv", "tsv"], None)
            .unwrap();

        assert_eq!(names(&files), vec!["Users.CSV", "terms.tsv", "pages.csv"]);
        assert_eq!(files[0].extension, "csv");
        assert_eq!(files[2].size, 7);
    }

    #[test]
    fn test_glob_pattern_is_case_insensitive() {
        let dir = tree();

        let files = WalkDirDiscovery::new()
            .discover(dir.path(), &["csv"], Some("users*"))
            .unwrap();

        assert_eq!(names(&files), vec!["Users.CSV"]);
    }

    #[test]
    fn test_regex_pattern() {
        let dir = tree();

        let files = WalkDirDiscovery::new()
            .discover(dir.path(), &["csv", "tsv"], Some("/^(pages|terms)\\./"))
            .unwrap();

        assert_eq!(names(&files), vec!["terms.tsv", "pages.csv"]);
    }

    #[test]
    fn test_invalid_regex_is_discovery_error() {
        let dir = tree();

        let result = WalkDirDiscovery::new().discover(dir.path(), &["csv"], Some("/(/"));

        assert!(matches!(result, Err(ImportError::Discovery(_))));
    }

    #[test]
    fn test_max_depth_skips_nested() {
        let dir = tree();

        let files = WalkDirDiscovery::new()
            .with_max_depth(1)
            .discover(dir.path(), &["tsv"], None)
            .unwrap();

        assert!(files.is_empty());
    }

    #[test]
    fn test_root_must_be_a_directory() {
        let dir = tree();

        let result =
            WalkDirDiscovery::new().discover(&dir.path().join("pages.csv"), &["csv"], None);

        assert!(matches!(result, Err(ImportError::InvalidPath(_))));
    }
}
