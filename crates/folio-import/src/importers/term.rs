use super::{entry_for, into_fields, skipped, take_metadata, take_seo, take_text};
use async_trait::async_trait;
use folio_import_types::{
    ImportLogEntry, ImportResult, ImportType, Importer, MetadataStrategy, PathKey, Row,
};
use folio_records::{EntityKind, EntityRecord, ResolutionContext, TermKind};
use std::sync::Arc;

/// Imports taxonomy terms
///
/// Requires `path` and `taxonomy`; the last path segment becomes the slug
/// and the preceding segments name the parent term.
pub struct TermImporter {
    ctx: ResolutionContext,
    strategy: Option<Arc<dyn MetadataStrategy>>,
}

impl TermImporter {
    pub fn new(ctx: ResolutionContext, strategy: Option<Arc<dyn MetadataStrategy>>) -> Self {
        Self { ctx, strategy }
    }
}

#[async_trait]
impl Importer for TermImporter {
    fn import_type(&self) -> ImportType {
        ImportType::Term
    }

    async fn import(&self, mut row: Row) -> ImportResult<ImportLogEntry> {
        let (path, taxonomy) = match (take_text(&mut row, "path"), take_text(&mut row, "taxonomy")) {
            (Some(path), Some(taxonomy)) => (path, taxonomy),
            (path, _) => return Ok(skipped(TermKind::KEY_COLUMN, path.as_deref())),
        };
        let key = PathKey::parse(&path)?;

        let mut metadata = take_metadata(&mut row);
        metadata.extend(take_seo(&mut row, self.strategy.as_deref())?);

        let mut record = EntityRecord::new(TermKind::new(taxonomy), key, self.ctx.clone());
        record.set(into_fields(row));
        if !metadata.is_empty() {
            record.set_metadata(metadata);
        }

        let status = record.save().await;
        Ok(entry_for(&mut record, status).await)
    }
}
