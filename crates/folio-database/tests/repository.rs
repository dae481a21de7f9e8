//! `SeaOrmRepository` against an in-memory SQLite database

use folio_core::ImportConfig;
use folio_database::test_utils::memory_repository;
use folio_database::{apply_site_config, ContentTypeKind};
use folio_import_types::{EntityRepository, EntityScope, StoreError};
use serde_json::{json, Map, Value};

fn fields(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

fn pages() -> EntityScope {
    EntityScope::Post("page".to_string())
}

#[tokio::test]
async fn test_post_hierarchy_lookup() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let about = repository
        .create(&pages(), &fields(json!({"slug": "about", "title": "About"})))
        .await?;
    let team = repository
        .create(
            &pages(),
            &fields(json!({"slug": "team", "parent": about.id, "title": "Team"})),
        )
        .await?;

    let found = repository.find_by_key(&pages(), "about/team").await?;
    assert_eq!(found.map(|entity| entity.id), Some(team.id));

    assert!(repository.find_by_key(&pages(), "team").await?.is_none());
    assert!(repository.find_by_key(&pages(), "about/missing").await?.is_none());
    assert!(repository
        .find_by_key(&EntityScope::Post("post".into()), "about")
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_fields_round_trip() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let written = fields(json!({
        "slug": "pricing",
        "type": "page",
        "parent": 0,
        "title": "Pricing",
        "body": "Plans",
        "author": 3,
        "tags": ["a", "b"],
        "template": "wide"
    }));

    let created = repository.create(&pages(), &written).await?;
    let stored = repository.find_by_id(&pages(), created.id).await?.unwrap();

    for (key, value) in &written {
        assert_eq!(stored.field(key), Some(value), "field {}", key);
    }
    Ok(())
}

#[tokio::test]
async fn test_update_keeps_unsupplied_fields() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let created = repository
        .create(
            &pages(),
            &fields(json!({"slug": "contact", "title": "Contact", "template": "narrow"})),
        )
        .await?;

    let updated = repository
        .update(
            &pages(),
            created.id,
            &fields(json!({"id": created.id, "title": "Contact us"})),
        )
        .await?;

    assert_eq!(updated.field("title"), Some(&json!("Contact us")));
    assert_eq!(updated.field("template"), Some(&json!("narrow")));
    assert_eq!(updated.field("slug"), Some(&json!("contact")));
    Ok(())
}

#[tokio::test]
async fn test_create_rejects_missing_slug_and_duplicates() -> anyhow::Result<()> {
    let repository = memory_repository().await?;

    let missing = repository
        .create(&pages(), &fields(json!({"title": "Home"})))
        .await;
    assert!(matches!(missing, Err(StoreError::Rejected(_))));

    repository
        .create(&pages(), &fields(json!({"slug": "home"})))
        .await?;
    let duplicate = repository
        .create(&pages(), &fields(json!({"slug": "home"})))
        .await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_update_missing_entity() -> anyhow::Result<()> {
    let repository = memory_repository().await?;

    let result = repository
        .update(&pages(), 42, &fields(json!({"title": "Ghost"})))
        .await;

    assert!(matches!(result, Err(StoreError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_terms_by_slug_within_taxonomy() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let categories = EntityScope::Term("category".to_string());
    let tags = EntityScope::Term("tag".to_string());

    let news = repository
        .create(&categories, &fields(json!({"slug": "news", "name": "News"})))
        .await?;
    repository
        .create(
            &categories,
            &fields(json!({"slug": "local", "name": "Local", "parent": news.id})),
        )
        .await?;

    let local = repository.find_by_key(&categories, "local").await?.unwrap();
    assert_eq!(local.field("parent"), Some(&json!(news.id)));
    assert_eq!(local.field("taxonomy"), Some(&json!("category")));
    assert!(repository.find_by_key(&tags, "local").await?.is_none());

    let nameless = repository
        .create(&tags, &fields(json!({"slug": "misc"})))
        .await;
    assert!(matches!(nameless, Err(StoreError::Rejected(_))));
    Ok(())
}

#[tokio::test]
async fn test_users_roles_and_password_hashing() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let scope = EntityScope::User;

    let ana = repository
        .create(
            &scope,
            &fields(json!({
                "login": "ana",
                "email": "ana@example.com",
                "role": "editor",
                "password": "correct horse",
                "display_name": "Ana"
            })),
        )
        .await?;

    assert_eq!(ana.roles(), vec!["editor"]);
    assert!(ana.field("password").is_none());
    assert_eq!(ana.field("display_name"), Some(&json!("Ana")));
    assert!(repository.verify_password("ana", "correct horse").await?);
    assert!(!repository.verify_password("ana", "wrong").await?);

    let updated = repository
        .update(&scope, ana.id, &fields(json!({"role": "administrator"})))
        .await?;
    assert_eq!(updated.roles(), vec!["administrator"]);

    let duplicate = repository
        .create(
            &scope,
            &fields(json!({"login": "ana", "email": "other@example.com"})),
        )
        .await;
    assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
    Ok(())
}

#[tokio::test]
async fn test_metadata_entries_replace_values() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let page = repository
        .create(&pages(), &fields(json!({"slug": "about"})))
        .await?;

    repository
        .write_metadata_entry(&pages(), page.id, "hero", &json!("blue"))
        .await?;
    repository
        .write_metadata_entry(&pages(), page.id, "hero", &json!("green"))
        .await?;
    repository
        .write_metadata_entry(&pages(), page.id, "featured", &json!(true))
        .await?;

    let metadata = repository.read_metadata(&pages(), page.id).await?;
    assert_eq!(metadata.get("hero"), Some(&vec!["green".to_string()]));
    assert_eq!(metadata.get("featured"), Some(&vec!["1".to_string()]));

    let other = repository
        .read_metadata(&EntityScope::User, page.id)
        .await?;
    assert!(other.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_rewrite_prefixes_and_front_page_from_config() -> anyhow::Result<()> {
    let repository = memory_repository().await?;
    let home = repository
        .create(&pages(), &fields(json!({"slug": "home", "title": "Home"})))
        .await?;

    let mut config = ImportConfig::default();
    config
        .rewrite_prefixes
        .post_types
        .insert("docs".to_string(), "documentation".to_string());
    config
        .rewrite_prefixes
        .taxonomies
        .insert("topic".to_string(), "/topics/".to_string());
    config.front_page = Some("/home".to_string());
    apply_site_config(&repository, &config).await?;

    assert_eq!(
        repository
            .rewrite_prefix(&EntityScope::Post("docs".into()))
            .await?,
        Some("documentation".to_string())
    );
    assert_eq!(
        repository
            .rewrite_prefix(&EntityScope::Term("topic".into()))
            .await?,
        Some("topics".to_string())
    );
    assert_eq!(repository.rewrite_prefix(&pages()).await?, None);
    assert_eq!(repository.front_page().await?, Some(home.id));

    repository
        .register_content_type(ContentTypeKind::PostType, "docs", None)
        .await?;
    repository.set_front_page(None).await?;
    assert_eq!(
        repository
            .rewrite_prefix(&EntityScope::Post("docs".into()))
            .await?,
        None
    );
    assert_eq!(repository.front_page().await?, None);
    Ok(())
}
