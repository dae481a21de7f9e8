//! Importer and source adapter traits
//!
//! An `Importer` turns one flat row into one reconciled entity. A
//! `SourceAdapter` turns input files into rows, hands each row to its
//! importer and collects the outcomes into an `ImportLog`.

use crate::{
    discovery::DiscoveredFile,
    error::{ImportError, ImportResult},
    fields::Row,
    log::{ImportLog, ImportLogEntry},
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Kind of entity an import run produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportType {
    /// Posts of any post type (pages, articles, custom types)
    Post,
    /// Taxonomy terms
    Term,
    /// User accounts
    User,
}

impl ImportType {
    pub const ALL: [ImportType; 3] = [ImportType::Post, ImportType::Term, ImportType::User];

    /// Get the string identifier for this type
    pub fn as_str(&self) -> &str {
        match self {
            ImportType::Post => "post",
            ImportType::Term => "term",
            ImportType::User => "user",
        }
    }

    /// Row column holding the natural key of this type
    pub fn key_column(&self) -> &'static str {
        match self {
            ImportType::Post | ImportType::Term => "path",
            ImportType::User => "login",
        }
    }

    /// Parse ImportType from string
    pub fn from_str(s: &str) -> Result<Self, ImportError> {
        match s.trim().to_lowercase().as_str() {
            "post" => Ok(ImportType::Post),
            "term" => Ok(ImportType::Term),
            "user" => Ok(ImportType::User),
            other => Err(ImportError::UnsupportedType(other.to_string())),
        }
    }
}

impl std::fmt::Display for ImportType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Family of input files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportSource {
    /// Delimited tables (CSV, TSV)
    Spreadsheet,
    /// Structured documents (JSON, Markdown with front matter, text)
    Content,
}

impl ImportSource {
    pub const ALL: [ImportSource; 2] = [ImportSource::Spreadsheet, ImportSource::Content];

    /// Get the string identifier for this source
    pub fn as_str(&self) -> &str {
        match self {
            ImportSource::Spreadsheet => "spreadsheet",
            ImportSource::Content => "content",
        }
    }

    /// Parse ImportSource from string
    pub fn from_str(s: &str) -> Result<Self, ImportError> {
        match s.trim().to_lowercase().as_str() {
            "spreadsheet" => Ok(ImportSource::Spreadsheet),
            "content" => Ok(ImportSource::Content),
            other => Err(ImportError::UnsupportedSource(other.to_string())),
        }
    }
}

impl std::fmt::Display for ImportSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reconciles one row against the store
///
/// Returning `Err` marks the row as failed; it never aborts the run.
#[async_trait]
pub trait Importer: Send + Sync {
    fn import_type(&self) -> ImportType;

    async fn import(&self, row: Row) -> ImportResult<ImportLogEntry>;
}

/// Reads a family of files and feeds their rows to an importer
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source(&self) -> ImportSource;

    /// Lowercased extensions this adapter can read
    fn supported_extensions(&self) -> &[&'static str];

    /// Import every file in order; a file that cannot be read is recorded on
    /// the log and the next file proceeds
    async fn import(&self, files: &[DiscoveredFile]) -> ImportResult<ImportLog>;
}
