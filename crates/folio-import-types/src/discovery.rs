//! File discovery and selection

use crate::error::ImportResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A candidate input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    /// File name without directory
    pub name: String,
    /// Lowercased extension without the dot
    pub extension: String,
    pub size: u64,
    pub modified: DateTime<Utc>,
}

/// Lists files under a directory
pub trait FileDiscovery: Send + Sync {
    /// Files below `root` with one of `extensions`, optionally filtered by a
    /// file name `pattern`, sorted by path
    fn discover(
        &self,
        root: &Path,
        extensions: &[&str],
        pattern: Option<&str>,
    ) -> ImportResult<Vec<DiscoveredFile>>;
}

/// Narrows a discovered file list, e.g. by asking the operator
pub trait FileSelector: Send + Sync {
    fn select(&self, files: Vec<DiscoveredFile>) -> ImportResult<Vec<DiscoveredFile>>;
}
