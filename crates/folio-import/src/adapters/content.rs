use super::{import_file, normalize_row};
use async_trait::async_trait;
use folio_import_types::{
    DiscoveredFile, ImportError, ImportLog, ImportResult, ImportSource, ImportType, Importer, Row,
    SourceAdapter,
};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;

const EXTENSIONS: [&str; 4] = ["json", "md", "markdown", "txt"];

const FRONT_MATTER_FENCE: &str = "---";

/// Reads structured content files
///
/// - `.json`: an array of objects (one row each) or a single object
/// - `.md`, `.markdown`, `.txt`: optional YAML front matter between `---`
///   fences; the remaining text becomes the `body` column. Post and term
///   imports default `path` to the file stem.
pub struct ContentAdapter {
    importer: Arc<dyn Importer>,
}

impl ContentAdapter {
    pub fn new(importer: Arc<dyn Importer>) -> Self {
        Self { importer }
    }

    fn read_rows(&self, file: &DiscoveredFile) -> Vec<ImportResult<Row>> {
        let text = match std::fs::read_to_string(&file.path) {
            Ok(text) => text,
            Err(e) => return vec![Err(e.into())],
        };

        match file.extension.as_str() {
            "json" => json_rows(&text),
            _ => match self.document_row(&file.path, &text) {
                Ok(row) => vec![Ok(row)],
                Err(e) => vec![Err(e)],
            },
        }
    }

    fn document_row(&self, path: &Path, text: &str) -> ImportResult<Row> {
        let (front_matter, body) = split_front_matter(text);

        let mut row = match front_matter {
            Some(yaml) => normalize_row(yaml_row(yaml)?),
            None => Row::new(),
        };

        let body = body.trim();
        if !body.is_empty() && !row.contains_key("body") {
            row.insert("body".to_string(), Value::String(body.to_string()));
        }

        let keyed_by_path = matches!(
            self.importer.import_type(),
            ImportType::Post | ImportType::Term
        );
        if keyed_by_path && !row.contains_key("path") {
            if let Some(stem) = path.file_stem() {
                row.insert(
                    "path".to_string(),
                    Value::String(stem.to_string_lossy().into_owned()),
                );
            }
        }

        Ok(row)
    }
}

fn json_rows(text: &str) -> Vec<ImportResult<Row>> {
    let value: Value = match serde_json::from_str(text) {
        Ok(value) => value,
        Err(e) => return vec![Err(e.into())],
    };

    match value {
        Value::Object(row) => vec![Ok(row)],
        Value::Array(items) => {
            let mut rows = Vec::with_capacity(items.len());
            for (index, item) in items.into_iter().enumerate() {
                match item {
                    Value::Object(row) => rows.push(Ok(row)),
                    other => {
                        rows.push(Err(ImportError::InvalidInput(format!(
                            "item {} is not an object: {}",
                            index, other
                        ))));
                        break;
                    }
                }
            }
            rows
        }
        other => vec![Err(ImportError::InvalidInput(format!(
            "expected an object or an array of objects, found {}",
            other
        )))],
    }
}

/// Split `---` fenced front matter from the document body
fn split_front_matter(text: &str) -> (Option<&str>, &str) {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let Some(rest) = text
        .strip_prefix(FRONT_MATTER_FENCE)
        .and_then(|rest| rest.strip_prefix("\r\n").or_else(|| rest.strip_prefix('\n')))
    else {
        return (None, text);
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == FRONT_MATTER_FENCE {
            return (Some(&rest[..offset]), &rest[offset + line.len()..]);
        }
        offset += line.len();
    }
    (None, text)
}

fn yaml_row(yaml: &str) -> ImportResult<Row> {
    if yaml.trim().is_empty() {
        return Ok(Row::new());
    }
    let value: serde_yaml::Value = serde_yaml::from_str(yaml)
        .map_err(|e| ImportError::InvalidInput(format!("front matter: {}", e)))?;
    match serde_json::to_value(value)? {
        Value::Object(row) => Ok(row),
        Value::Null => Ok(Row::new()),
        other => Err(ImportError::InvalidInput(format!(
            "front matter must be a mapping, found {}",
            other
        ))),
    }
}

#[async_trait]
impl SourceAdapter for ContentAdapter {
    fn source(&self) -> ImportSource {
        ImportSource::Content
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &EXTENSIONS
    }

    async fn import(&self, files: &[DiscoveredFile]) -> ImportResult<ImportLog> {
        let mut log = ImportLog::new();
        for file in files {
            let rows = self.read_rows(file);
            import_file(self.importer.as_ref(), file, rows, &mut log).await;
        }
        Ok(log)
    }
}
