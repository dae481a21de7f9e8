use super::{import_file, normalize_header};
use async_trait::async_trait;
use csv::ReaderBuilder;
use folio_import_types::{
    DiscoveredFile, ImportError, ImportLog, ImportResult, ImportSource, Importer, Row,
    SourceAdapter,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const EXTENSIONS: [&str; 2] = ["csv", "tsv"];

/// Reads delimited tables: comma separated (`.csv`) or tab separated (`.tsv`)
///
/// The first record holds the column names. Blank lines are skipped and
/// short records leave the trailing columns out of the row.
pub struct SpreadsheetAdapter {
    importer: Arc<dyn Importer>,
}

impl SpreadsheetAdapter {
    pub fn new(importer: Arc<dyn Importer>) -> Self {
        Self { importer }
    }

    fn delimiter(extension: &str) -> u8 {
        match extension {
            "tsv" => b'\t',
            _ => b',',
        }
    }

    /// All rows of a file; a read error ends the list
    fn read_rows(path: &Path, delimiter: u8) -> Vec<ImportResult<Row>> {
        let mut reader = match ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .delimiter(delimiter)
            .from_path(path)
        {
            Ok(reader) => reader,
            Err(e) => return vec![Err(csv_error(e))],
        };

        let headers: Vec<String> = match reader.headers() {
            Ok(headers) => headers.iter().map(normalize_header).collect(),
            Err(e) => return vec![Err(csv_error(e))],
        };

        let mut rows = Vec::new();
        for (index, record) in reader.records().enumerate() {
            let record = match record {
                Ok(record) => record,
                Err(e) => {
                    // +2 for 1-indexed and header row
                    rows.push(Err(ImportError::InvalidInput(format!(
                        "row {}: {}",
                        index + 2,
                        e
                    ))));
                    break;
                }
            };
            if record.iter().all(str::is_empty) {
                continue;
            }

            let row: Row = headers
                .iter()
                .zip(record.iter())
                .filter(|(header, _)| !header.is_empty())
                .map(|(header, value)| (header.clone(), Value::String(value.to_string())))
                .collect();
            rows.push(Ok(row));
        }
        rows
    }
}

fn csv_error(e: csv::Error) -> ImportError {
    ImportError::InvalidInput(e.to_string())
}

#[async_trait]
impl SourceAdapter for SpreadsheetAdapter {
    fn source(&self) -> ImportSource {
        ImportSource::Spreadsheet
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &EXTENSIONS
    }

    async fn import(&self, files: &[DiscoveredFile]) -> ImportResult<ImportLog> {
        let mut log = ImportLog::new();
        for file in files {
            let rows = Self::read_rows(&file.path, Self::delimiter(&file.extension));
            import_file(self.importer.as_ref(), file, rows, &mut log).await;
        }
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::test_support::{missing_file, write_file, Recorder};

    #[tokio::test]
    async fn test_csv_rows_are_normalized() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let csv = write_file(
            dir.path(),
            "pages.csv",
            "Path,Page Title,m:Hero\n about , Hello ,blue\n\ncontact,Contact,\n",
        );
        let recorder = Arc::new(Recorder::default());
        let adapter = SpreadsheetAdapter::new(recorder.clone());

        // Act
        let log = adapter.import(&[csv]).await.unwrap();

        // Assert
        let rows = recorder.rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("path"), Some(&Value::from("about")));
        assert_eq!(rows[0].get("page_title"), Some(&Value::from("Hello")));
        assert_eq!(rows[0].get("m:Hero"), Some(&Value::from("blue")));
        assert_eq!(log.total_entries(), 2);
        assert!(log.failures().is_empty());
    }

    #[tokio::test]
    async fn test_tsv_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let tsv = write_file(dir.path(), "terms.tsv", "path\tname\nnews\tNews, Events\n");
        let recorder = Arc::new(Recorder::default());
        let adapter = SpreadsheetAdapter::new(recorder.clone());

        adapter.import(&[tsv]).await.unwrap();

        assert_eq!(recorder.rows()[0].get("name"), Some(&Value::from("News, Events")));
    }

    #[tokio::test]
    async fn test_row_error_becomes_failed_entry() {
        let dir = tempfile::tempdir().unwrap();
        let csv = write_file(dir.path(), "mixed.csv", "path\ngood\nbad\n");
        let adapter = SpreadsheetAdapter::new(Arc::new(Recorder::default()));

        let log = adapter.import(&[csv]).await.unwrap();

        let summary = log.summary();
        assert_eq!(summary[0].counts.created, 1);
        assert_eq!(summary[0].counts.failed, 1);
        assert!(log.details().headers.contains(&"Error".to_string()));
    }

    #[tokio::test]
    async fn test_unreadable_file_is_recorded_and_next_file_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.csv", "path\na\n");
        let missing = missing_file(dir.path(), "gone.csv");
        let adapter = SpreadsheetAdapter::new(Arc::new(Recorder::default()));

        let log = adapter.import(&[missing, good]).await.unwrap();

        assert_eq!(log.failures().len(), 1);
        assert!(log.failures()[0].message.contains("gone.csv"));
        assert_eq!(log.total_entries(), 1);
    }
}
