//! Source adapters
//!
//! Adapters read files into rows and feed them to an importer one at a
//! time. A row the importer rejects becomes a `FAILED` entry; a file that
//! cannot be read stops at the failing row, keeps the entries logged so far
//! and is recorded as a failure while the next file proceeds.

mod content;
mod spreadsheet;

pub use content::ContentAdapter;
pub use spreadsheet::SpreadsheetAdapter;

use folio_import_types::{
    DiscoveredFile, ImportError, ImportLog, ImportLogEntry, ImportResult, Importer, Row,
    SaveStatus,
};
use serde_json::Value;
use tracing::{info, warn};

/// Canonical column name: trimmed, lowercased, spaces and dashes as `_`
///
/// Metadata columns (`m:` prefix) keep the case of their key.
pub fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim();
    let lowered = trimmed.to_lowercase();
    if lowered.starts_with("m:") {
        return format!("m:{}", trimmed[2..].trim());
    }
    lowered
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Normalize keys and trim string values
pub fn normalize_row(row: Row) -> Row {
    row.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => Value::String(s.trim().to_string()),
                other => other,
            };
            (normalize_header(&key), value)
        })
        .collect()
}

/// Import the rows of one file into `log`
///
/// `rows` ends at the first read error, if any.
pub(crate) async fn import_file(
    importer: &dyn Importer,
    file: &DiscoveredFile,
    rows: Vec<ImportResult<Row>>,
    log: &mut ImportLog,
) {
    info!(
        "Importing {} rows from {}",
        importer.import_type(),
        file.path.display()
    );

    let key_column = importer.import_type().key_column();
    let mut entries = Vec::new();
    let mut failure = None;

    for row in rows {
        let row = match row {
            Ok(row) => normalize_row(row),
            Err(e) => {
                failure = Some(e);
                break;
            }
        };

        let key = row
            .get(key_column)
            .and_then(Value::as_str)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        match importer.import(row).await {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Row {:?} in {} failed: {}", key, file.name, e);
                entries.push(
                    ImportLogEntry::record(None, key_column, key.as_deref(), None, SaveStatus::Failed)
                        .with("error", e.to_string()),
                );
            }
        }
    }

    log.add(&file.path, entries);

    if let Some(e) = failure {
        let error = ImportError::Adapter {
            file: file.path.display().to_string(),
            message: e.to_string(),
        };
        warn!("{}", error);
        log.record_failure(&file.path, error.to_string());
    }
}
