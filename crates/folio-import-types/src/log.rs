//! Per-file outcome aggregation and reporting

use crate::status::SaveStatus;
use folio_core::title_case;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Placeholder for identifiers that could not be resolved
pub const NOT_AVAILABLE: &str = "N/A";

/// Column headers of the summary table
pub const SUMMARY_HEADERS: [&str; 7] = [
    "File",
    "Total",
    "Created",
    "Updated",
    "Skipped",
    "Failed",
    "No Change",
];

const STATUS_COLUMN: &str = "status";

/// Outcome of one row: ordered columns followed by the status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportLogEntry {
    columns: Vec<(String, String)>,
    status: SaveStatus,
}

impl ImportLogEntry {
    pub fn new(status: SaveStatus) -> Self {
        Self {
            columns: Vec::new(),
            status,
        }
    }

    /// Standard entry: `id`, the key column, `parent`
    pub fn record(
        id: Option<i64>,
        key_column: &str,
        key: Option<&str>,
        parent: Option<i64>,
        status: SaveStatus,
    ) -> Self {
        let text = |id: Option<i64>| id.map_or_else(|| NOT_AVAILABLE.to_string(), |id| id.to_string());

        Self::new(status)
            .with("id", text(id))
            .with(key_column, key.unwrap_or(NOT_AVAILABLE))
            .with("parent", text(parent))
    }

    /// Set a column, keeping its position when it already exists
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((key, value)),
        }
        self
    }

    pub fn column(&self, key: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn columns(&self) -> &[(String, String)] {
        &self.columns
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns
            .iter()
            .map(|(key, _)| key.as_str())
            .chain(std::iter::once(STATUS_COLUMN))
    }
}

/// Entries produced from one source file, in row order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileLog {
    pub file: PathBuf,
    pub entries: Vec<ImportLogEntry>,
}

/// A source file that could not be (fully) processed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileFailure {
    pub file: PathBuf,
    pub message: String,
}

/// Per-status counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub noop: usize,
}

impl StatusCounts {
    pub fn record(&mut self, status: SaveStatus) {
        self.total += 1;
        match status {
            SaveStatus::Created => self.created += 1,
            SaveStatus::Updated => self.updated += 1,
            SaveStatus::Skipped => self.skipped += 1,
            SaveStatus::Failed => self.failed += 1,
            SaveStatus::Noop => self.noop += 1,
        }
    }

    pub fn get(&self, status: SaveStatus) -> usize {
        match status {
            SaveStatus::Created => self.created,
            SaveStatus::Updated => self.updated,
            SaveStatus::Skipped => self.skipped,
            SaveStatus::Failed => self.failed,
            SaveStatus::Noop => self.noop,
        }
    }
}

/// Summary row of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSummary {
    /// Base name of the source file
    pub file: String,
    pub counts: StatusCounts,
}

impl FileSummary {
    /// Cells in `SUMMARY_HEADERS` order
    pub fn cells(&self) -> Vec<String> {
        let mut cells = vec![self.file.clone(), self.counts.total.to_string()];
        cells.extend(
            SaveStatus::ALL
                .iter()
                .map(|status| self.counts.get(*status).to_string()),
        );
        cells
    }
}

/// Flattened view of every entry in the log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DetailTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Outcomes of an import run keyed by source file
///
/// File order is insertion order. Adding a file that is already present
/// replaces its entries in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportLog {
    files: Vec<FileLog>,
    failures: Vec<FileFailure>,
}

impl ImportLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: impl Into<PathBuf>, entries: Vec<ImportLogEntry>) {
        let file = file.into();
        match self.files.iter_mut().find(|log| log.file == file) {
            Some(existing) => existing.entries = entries,
            None => self.files.push(FileLog { file, entries }),
        }
    }

    pub fn record_failure(&mut self, file: impl Into<PathBuf>, message: impl Into<String>) {
        self.failures.push(FileFailure {
            file: file.into(),
            message: message.into(),
        });
    }

    /// Append another log's files and failures
    pub fn extend(&mut self, other: ImportLog) {
        for log in other.files {
            self.add(log.file, log.entries);
        }
        self.failures.extend(other.failures);
    }

    pub fn files(&self) -> &[FileLog] {
        &self.files
    }

    pub fn entries(&self, file: &Path) -> Option<&[ImportLogEntry]> {
        self.files
            .iter()
            .find(|log| log.file == file)
            .map(|log| log.entries.as_slice())
    }

    pub fn failures(&self) -> &[FileFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.failures.is_empty()
    }

    /// Per-file counts, in file order
    pub fn summary(&self) -> Vec<FileSummary> {
        self.files
            .iter()
            .map(|log| {
                let mut counts = StatusCounts::default();
                for entry in &log.entries {
                    counts.record(entry.status);
                }
                FileSummary {
                    file: log
                        .file
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| log.file.display().to_string()),
                    counts,
                }
            })
            .collect()
    }

    /// Counts across every file
    pub fn totals(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in self.files.iter().flat_map(|log| log.entries.iter()) {
            counts.record(entry.status);
        }
        counts
    }

    pub fn total_entries(&self) -> usize {
        self.files.iter().map(|log| log.entries.len()).sum()
    }

    /// Every entry as a row under the union of all column keys
    ///
    /// Headers appear in first-seen order and are title-cased. Missing
    /// cells are blank; the status cell holds the status label.
    pub fn details(&self) -> DetailTable {
        let entries: Vec<&ImportLogEntry> =
            self.files.iter().flat_map(|log| log.entries.iter()).collect();
        if entries.is_empty() {
            return DetailTable::default();
        }

        let mut keys: Vec<&str> = Vec::new();
        for key in entries.iter().flat_map(|entry| entry.keys()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }

        let rows = entries
            .iter()
            .map(|entry| {
                keys.iter()
                    .map(|key| {
                        if *key == STATUS_COLUMN {
                            entry.status.label().to_string()
                        } else {
                            entry.column(key).unwrap_or_default().to_string()
                        }
                    })
                    .collect()
            })
            .collect();

        DetailTable {
            headers: keys.iter().map(|key| title_case(key)).collect(),
            rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: i64, path: &str, status: SaveStatus) -> ImportLogEntry {
        ImportLogEntry::record(Some(id), "path", Some(path), None, status)
    }

    #[test]
    fn test_entry_columns() {
        let entry = ImportLogEntry::record(None, "login", Some("ana"), None, SaveStatus::Skipped);

        assert_eq!(entry.column("id"), Some("N/A"));
        assert_eq!(entry.column("login"), Some("ana"));
        assert_eq!(entry.column("parent"), Some("N/A"));
        assert_eq!(entry.status(), SaveStatus::Skipped);
    }

    #[test]
    fn test_with_overwrites_in_place() {
        let entry = ImportLogEntry::new(SaveStatus::Created)
            .with("id", "1")
            .with("path", "a")
            .with("id", "2");

        assert_eq!(entry.columns()[0], ("id".to_string(), "2".to_string()));
        assert_eq!(entry.columns().len(), 2);
    }

    #[test]
    fn test_summary_counts_sum_to_total() {
        let mut log = ImportLog::new();
        log.add(
            "/data/pages.csv",
            vec![
                entry(1, "a", SaveStatus::Created),
                entry(2, "b", SaveStatus::Noop),
                entry(3, "c", SaveStatus::Failed),
                entry(4, "d", SaveStatus::Created),
            ],
        );

        let summary = log.summary();

        assert_eq!(summary.len(), 1);
        let counts = summary[0].counts;
        assert_eq!(summary[0].file, "pages.csv");
        assert_eq!(counts.total, 4);
        assert_eq!(counts.created, 2);
        assert_eq!(counts.noop, 1);
        assert_eq!(counts.failed, 1);
        assert_eq!(
            counts.created + counts.updated + counts.skipped + counts.failed + counts.noop,
            counts.total
        );
        assert_eq!(summary[0].cells(), ["pages.csv", "4", "2", "0", "0", "1", "1"]);
    }

    #[test]
    fn test_add_replaces_existing_file_in_place() {
        let mut log = ImportLog::new();
        log.add("a.csv", vec![entry(1, "a", SaveStatus::Created)]);
        log.add("b.csv", vec![entry(2, "b", SaveStatus::Created)]);
        log.add("a.csv", vec![entry(1, "a", SaveStatus::Noop)]);

        let files: Vec<_> = log.summary().into_iter().map(|s| s.file).collect();
        assert_eq!(files, ["a.csv", "b.csv"]);
        assert_eq!(log.total_entries(), 2);
        assert_eq!(log.totals().noop, 1);
    }

    #[test]
    fn test_details_union_of_columns() {
        let mut log = ImportLog::new();
        log.add("terms.csv", vec![entry(1, "news", SaveStatus::Created)]);
        log.add(
            "users.csv",
            vec![ImportLogEntry::record(Some(7), "login", Some("ana"), None, SaveStatus::Updated)],
        );

        let details = log.details();

        assert_eq!(details.headers, ["Id", "Path", "Parent", "Status", "Login"]);
        assert_eq!(details.rows[0], ["1", "news", "N/A", "CREATED", ""]);
        assert_eq!(details.rows[1], ["7", "", "N/A", "UPDATED", "ana"]);
    }

    #[test]
    fn test_empty_log() {
        let log = ImportLog::new();
        assert!(log.summary().is_empty());
        assert!(log.details().headers.is_empty());
        assert!(log.details().is_empty());
        assert_eq!(log.total_entries(), 0);
    }

    #[test]
    fn test_failures_are_kept() {
        let mut log = ImportLog::new();
        log.record_failure("broken.json", "expected value at line 1");

        assert!(!log.is_empty());
        assert_eq!(log.failures()[0].message, "expected value at line 1");
    }

    #[test]
    fn test_extend() {
        let mut log = ImportLog::new();
        log.add("a.csv", vec![entry(1, "a", SaveStatus::Created)]);

        let mut other = ImportLog::new();
        other.add("b.csv", vec![entry(2, "b", SaveStatus::Updated)]);
        other.record_failure("c.csv", "bad");

        log.extend(other);

        assert_eq!(log.files().len(), 2);
        assert_eq!(log.failures().len(), 1);
        assert_eq!(
            log.entries(Path::new("b.csv")).unwrap()[0].status(),
            SaveStatus::Updated
        );
    }
}
