use super::{entry_for, into_fields, skipped, take_metadata, take_seo, take_text, ImportSettings};
use async_trait::async_trait;
use folio_import_types::{
    ImportLogEntry, ImportResult, ImportType, Importer, MetadataStrategy, PathKey, Row,
};
use folio_records::{EntityKind, EntityRecord, PostKind, ResolutionContext, TermKind, UserKind};
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;

/// Imports posts of any post type
///
/// Recognized columns: `path` (required), `type`, `author` (numeric id or
/// login), `categories` and `tags` (delimited lists), `seo_*` and `m:*`.
/// Everything else is stored as a post field.
pub struct PostImporter {
    ctx: ResolutionContext,
    settings: ImportSettings,
    strategy: Option<Arc<dyn MetadataStrategy>>,
}

impl PostImporter {
    pub fn new(
        ctx: ResolutionContext,
        settings: ImportSettings,
        strategy: Option<Arc<dyn MetadataStrategy>>,
    ) -> Self {
        Self {
            ctx,
            settings,
            strategy,
        }
    }

    async fn resolve_author(&self, author: &str) -> Option<i64> {
        if let Ok(id) = author.parse::<i64>() {
            return Some(id);
        }

        let mut user = EntityRecord::new(UserKind, author.to_string(), self.ctx.clone());
        match user.find().await {
            Ok(Some(entity)) => Some(entity.id),
            Ok(None) => {
                warn!("Author '{}' not found, leaving author unset", author);
                None
            }
            Err(e) => {
                warn!("Failed to resolve author '{}': {}", author, e);
                None
            }
        }
    }

    async fn resolve_categories(&self, categories: &str) -> Vec<i64> {
        let mut ids = Vec::new();
        for path in self.settings.split_list(categories) {
            let key = match PathKey::parse(&path) {
                Ok(key) => key,
                Err(e) => {
                    warn!("Ignoring category '{}': {}", path, e);
                    continue;
                }
            };
            let mut term = EntityRecord::new(
                TermKind::new(self.settings.category_taxonomy.as_str()),
                key,
                self.ctx.clone(),
            );
            match term.find().await {
                Ok(Some(entity)) => {
                    if !ids.contains(&entity.id) {
                        ids.push(entity.id);
                    }
                }
                Ok(None) => warn!(
                    "Category '{}' not found in {}",
                    path, self.settings.category_taxonomy
                ),
                Err(e) => warn!("Failed to resolve category '{}': {}", path, e),
            }
        }
        ids
    }
}

#[async_trait]
impl Importer for PostImporter {
    fn import_type(&self) -> ImportType {
        ImportType::Post
    }

    async fn import(&self, mut row: Row) -> ImportResult<ImportLogEntry> {
        let Some(path) = take_text(&mut row, "path") else {
            return Ok(skipped(PostKind::KEY_COLUMN, None));
        };
        let key = PathKey::parse(&path)?;
        let post_type =
            take_text(&mut row, "type").unwrap_or_else(|| self.settings.default_post_type.clone());

        let mut metadata = take_metadata(&mut row);
        metadata.extend(take_seo(&mut row, self.strategy.as_deref())?);

        let author = take_text(&mut row, "author");
        let categories = take_text(&mut row, "categories");
        let tags = take_text(&mut row, "tags");

        let mut record = EntityRecord::new(PostKind::new(post_type), key, self.ctx.clone());
        record.set(into_fields(row));

        if let Some(author) = author {
            if let Some(id) = self.resolve_author(&author).await {
                record.set_field("author", id);
            }
        }
        if let Some(categories) = categories {
            let ids = self.resolve_categories(&categories).await;
            if !ids.is_empty() {
                record.set_field("categories", ids);
            }
        }
        if let Some(tags) = tags {
            let tags = self.settings.split_list(&tags);
            if !tags.is_empty() {
                record.set_field(
                    "tags",
                    Value::Array(tags.into_iter().map(Value::String).collect()),
                );
            }
        }
        if !metadata.is_empty() {
            record.set_metadata(metadata);
        }

        let status = record.save().await;
        Ok(entry_for(&mut record, status).await)
    }
}
