use super::{
    entry_for, into_fields, skipped, take_metadata, take_seo, take_social_profiles, take_text,
};
use async_trait::async_trait;
use folio_import_types::{ImportLogEntry, ImportResult, ImportType, Importer, MetadataStrategy, Row};
use folio_records::{EntityKind, EntityRecord, ResolutionContext, UserKind};
use std::sync::Arc;

/// Imports user accounts keyed by `login`
///
/// Social profile columns (`facebook`, `twitter`, `instagram`, `linkedin`,
/// `youtube`) are mapped to metadata through the configured strategy.
pub struct UserImporter {
    ctx: ResolutionContext,
    strategy: Option<Arc<dyn MetadataStrategy>>,
}

impl UserImporter {
    pub fn new(ctx: ResolutionContext, strategy: Option<Arc<dyn MetadataStrategy>>) -> Self {
        Self { ctx, strategy }
    }
}

#[async_trait]
impl Importer for UserImporter {
    fn import_type(&self) -> ImportType {
        ImportType::User
    }

    async fn import(&self, mut row: Row) -> ImportResult<ImportLogEntry> {
        let Some(login) = take_text(&mut row, "login") else {
            return Ok(skipped(UserKind::KEY_COLUMN, None));
        };

        let strategy = self.strategy.as_deref();
        let mut metadata = take_metadata(&mut row);
        metadata.extend(take_seo(&mut row, strategy)?);
        metadata.extend(take_social_profiles(&mut row, strategy)?);

        let mut record = EntityRecord::new(UserKind, login, self.ctx.clone());
        record.set(into_fields(row));
        if !metadata.is_empty() {
            record.set_metadata(metadata);
        }

        let status = record.save().await;
        Ok(entry_for(&mut record, status).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RankMathStrategy;
    use folio_import_types::{EntityScope, ImportError, SaveStatus};
    use folio_records::MemoryRepository;
    use serde_json::{json, Value};

    fn row(value: Value) -> Row {
        match value {
            Value::Object(map) => map,
            _ => Row::new(),
        }
    }

    fn setup(strategy: Option<Arc<dyn MetadataStrategy>>) -> (Arc<MemoryRepository>, UserImporter) {
        let repository = Arc::new(MemoryRepository::new());
        let ctx = ResolutionContext::new(repository.clone());
        (repository, UserImporter::new(ctx, strategy))
    }

    #[tokio::test]
    async fn test_missing_login_is_skipped() {
        let (_repository, importer) = setup(None);

        let entry = importer
            .import(row(json!({"email": "a@example.com"})))
            .await
            .unwrap();

        assert_eq!(entry.status(), SaveStatus::Skipped);
        assert_eq!(entry.column("login"), Some("N/A"));
    }

    #[tokio::test]
    async fn test_create_then_role_membership_noop() {
        let (repository, importer) = setup(None);
        let input = json!({"login": "ana", "email": "ana@example.com", "role": "editor"});

        let created = importer.import(row(input.clone())).await.unwrap();
        let replay = importer.import(row(input)).await.unwrap();

        assert_eq!(created.status(), SaveStatus::Created);
        assert_eq!(replay.status(), SaveStatus::Noop);
        assert_eq!(created.column("parent"), Some("N/A"));
        let users = repository.entities(&EntityScope::User);
        assert_eq!(users[0].roles(), ["editor"]);
        assert!(users[0].field("password").is_none());
    }

    #[tokio::test]
    async fn test_login_column_in_row_is_not_overridden() {
        let (repository, importer) = setup(None);

        importer
            .import(row(json!({"login": " ana ", "email": "ana@example.com", "password": "hunter2"})))
            .await
            .unwrap();

        let users = repository.entities(&EntityScope::User);
        assert_eq!(users[0].field("login"), Some(&json!("ana")));
    }

    #[tokio::test]
    async fn test_social_profiles_need_strategy() {
        let (_repository, importer) = setup(None);

        let result = importer
            .import(row(json!({"login": "ana", "email": "a@b.c", "twitter": "https://x.com/ana"})))
            .await;

        assert!(matches!(result, Err(ImportError::UnsupportedCapability(_))));
    }

    #[tokio::test]
    async fn test_social_profiles_mapped() {
        let (repository, importer) = setup(Some(Arc::new(RankMathStrategy)));

        let entry = importer
            .import(row(json!({
                "login": "ana",
                "email": "ana@example.com",
                "facebook": "https://facebook.com/ana",
                "linkedin": "https://linkedin.com/in/ana"
            })))
            .await
            .unwrap();

        let id: i64 = entry.column("id").unwrap().parse().unwrap();
        let metadata = repository.metadata(&EntityScope::User, id);
        assert_eq!(metadata.get("facebook"), Some(&vec!["https://facebook.com/ana".to_string()]));
        assert_eq!(
            metadata.get("additional_profile_urls"),
            Some(&vec!["https://linkedin.com/in/ana".to_string()])
        );
    }
}
