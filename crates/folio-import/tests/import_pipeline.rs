//! End-to-end runs of the import pipeline against the in-memory repository

use folio_core::{ImportConfig, SeoProvider};
use folio_import::{ImportOrchestrator, ImportReport, ImportRequest};
use folio_import_types::{EntityScope, ImportSource, ImportType, SaveStatus};
use folio_records::{MemoryRepository, ResolutionContext};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;

fn pages() -> EntityScope {
    EntityScope::Post("page".to_string())
}

async fn run(
    repository: &Arc<MemoryRepository>,
    config: &ImportConfig,
    import_type: ImportType,
    source: ImportSource,
    dir: &Path,
) -> ImportReport {
    // Every run gets a fresh context, as separate CLI invocations would
    let ctx = ResolutionContext::new(repository.clone());
    let orchestrator = ImportOrchestrator::with_defaults(ctx, config);
    let request = ImportRequest::new(import_type, source).with_path(dir);
    orchestrator.run(&request, None).await.unwrap()
}

fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).unwrap();
}

#[tokio::test]
async fn test_child_page_resolves_existing_parent() {
    // Arrange
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pages.csv",
        "Path,Title,Body\nabout/team,Team,Meet the team\n",
    );
    let repository = Arc::new(MemoryRepository::new());
    let about = repository.seed(&pages(), json!({"slug": "about", "parent": 0, "title": "About"}));

    // Act
    let report = run(
        &repository,
        &ImportConfig::default(),
        ImportType::Post,
        ImportSource::Spreadsheet,
        dir.path(),
    )
    .await;

    // Assert
    let entry = &report.log.files()[0].entries[0];
    assert_eq!(entry.status(), SaveStatus::Created);
    assert_eq!(entry.column("path"), Some("about/team"));
    assert_eq!(entry.column("parent"), Some(about.id.to_string().as_str()));

    let team = repository
        .entities(&pages())
        .into_iter()
        .find(|page| page.field("slug") == Some(&json!("team")))
        .unwrap();
    assert_eq!(team.field("parent"), Some(&json!(about.id)));
    assert_eq!(entry.column("id"), Some(team.id.to_string().as_str()));
}

#[tokio::test]
async fn test_replayed_run_is_noop_without_writes() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pages.csv",
        "path,title,body,m:hero\nabout,About,About us,blue\nabout/team,Team,Meet the team,\n",
    );
    let repository = Arc::new(MemoryRepository::new());
    let config = ImportConfig::default();

    let first = run(&repository, &config, ImportType::Post, ImportSource::Spreadsheet, dir.path()).await;
    let writes = repository.writes();
    let second = run(&repository, &config, ImportType::Post, ImportSource::Spreadsheet, dir.path()).await;

    assert_eq!(first.log.totals().get(SaveStatus::Created), 2);
    assert_eq!(second.log.totals().get(SaveStatus::Noop), 2);
    assert_eq!(repository.writes(), writes);

    let ids = |report: &ImportReport| -> Vec<String> {
        report.log.files()[0]
            .entries
            .iter()
            .map(|entry| entry.column("id").unwrap_or_default().to_string())
            .collect()
    };
    assert_eq!(ids(&first), ids(&second));
}

#[tokio::test]
async fn test_changed_field_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(MemoryRepository::new());
    let config = ImportConfig::default();

    write(dir.path(), "pages.csv", "path,title\ncontact,Contact\n");
    run(&repository, &config, ImportType::Post, ImportSource::Spreadsheet, dir.path()).await;

    write(dir.path(), "pages.csv", "path,title\ncontact,Contact us\n");
    let report = run(&repository, &config, ImportType::Post, ImportSource::Spreadsheet, dir.path()).await;

    assert_eq!(report.log.totals().get(SaveStatus::Updated), 1);
    let pages = repository.entities(&pages());
    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].field("title"), Some(&json!("Contact us")));
}

#[tokio::test]
async fn test_blank_key_is_skipped_and_failures_do_not_stop_the_file() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pages.csv",
        "path,title,seo_title\n,Orphan,\nlanding,,\npricing,Pricing,Best prices\nfaq,FAQ,\n",
    );
    let repository = Arc::new(MemoryRepository::new());

    let report = run(
        &repository,
        &ImportConfig::default(),
        ImportType::Post,
        ImportSource::Spreadsheet,
        dir.path(),
    )
    .await;

    let statuses: Vec<SaveStatus> = report.log.files()[0]
        .entries
        .iter()
        .map(|entry| entry.status())
        .collect();
    assert_eq!(
        statuses,
        vec![
            SaveStatus::Skipped,
            SaveStatus::Failed,
            SaveStatus::Failed,
            SaveStatus::Created
        ]
    );
    let pricing = &report.log.files()[0].entries[2];
    assert!(pricing
        .column("error")
        .unwrap_or_default()
        .contains("Unsupported capability"));

    let summary = report.log.summary();
    assert_eq!(summary[0].counts.total, 4);
}

#[tokio::test]
async fn test_seo_columns_with_provider() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pages.csv",
        "path,title,SEO Title,SEO Description\npricing,Pricing,Best prices,Plans and pricing\n",
    );
    let repository = Arc::new(MemoryRepository::new());
    let config = ImportConfig {
        seo_provider: Some(SeoProvider::Yoast),
        ..ImportConfig::default()
    };

    let report = run(&repository, &config, ImportType::Post, ImportSource::Spreadsheet, dir.path()).await;

    let entry = &report.log.files()[0].entries[0];
    assert_eq!(entry.status(), SaveStatus::Created);
    let id: i64 = entry.column("id").unwrap().parse().unwrap();
    let metadata = repository.metadata(&pages(), id);
    assert_eq!(metadata.get("_yoast_wpseo_title"), Some(&vec!["Best prices".to_string()]));
    assert_eq!(
        metadata.get("_yoast_wpseo_metadesc"),
        Some(&vec!["Plans and pricing".to_string()])
    );
}

#[tokio::test]
async fn test_terms_and_posts_share_category_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let repository = Arc::new(MemoryRepository::new());
    let config = ImportConfig::default();

    let terms = dir.path().join("terms");
    std::fs::create_dir(&terms).unwrap();
    write(
        &terms,
        "categories.tsv",
        "path\ttaxonomy\tname\nnews\tcategory\tNews\nnews/local\tcategory\tLocal\n",
    );
    let term_report = run(&repository, &config, ImportType::Term, ImportSource::Spreadsheet, &terms).await;

    let posts = dir.path().join("posts");
    std::fs::create_dir(&posts).unwrap();
    write(
        &posts,
        "launch.md",
        "---\ntype: post\ntitle: Launch\ncategories: news/local\ntags: a, b, a\n---\nWe launched.\n",
    );
    let post_report = run(&repository, &config, ImportType::Post, ImportSource::Content, &posts).await;

    let local = &term_report.log.files()[0].entries[1];
    assert_eq!(local.status(), SaveStatus::Created);
    assert_eq!(
        local.column("parent"),
        term_report.log.files()[0].entries[0].column("id")
    );

    assert_eq!(post_report.log.totals().get(SaveStatus::Created), 1);
    let post = &repository.entities(&EntityScope::Post("post".to_string()))[0];
    assert_eq!(post.field("slug"), Some(&json!("launch")));
    assert_eq!(post.field("body"), Some(&json!("We launched.")));
    assert_eq!(post.field("tags"), Some(&json!(["a", "b"])));
    let local_id: i64 = local.column("id").unwrap().parse().unwrap();
    assert_eq!(post.field("categories"), Some(&json!([local_id])));
}

#[tokio::test]
async fn test_users_get_role_membership_and_no_password_echo() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "users.json",
        r#"[{"login": "ana", "email": "ana@example.com", "role": "editor"}]"#,
    );
    let repository = Arc::new(MemoryRepository::new());
    let config = ImportConfig::default();

    let first = run(&repository, &config, ImportType::User, ImportSource::Content, dir.path()).await;
    let second = run(&repository, &config, ImportType::User, ImportSource::Content, dir.path()).await;

    assert_eq!(first.log.totals().get(SaveStatus::Created), 1);
    assert_eq!(second.log.totals().get(SaveStatus::Noop), 1);
    let user = &repository.entities(&EntityScope::User)[0];
    assert_eq!(user.roles(), vec!["editor"]);
    assert!(user.field("password").is_none());

    let details = second.log.details();
    assert_eq!(details.headers, vec!["Id", "Login", "Parent", "Status"]);
    assert_eq!(details.rows[0][3], "NOOP");
}
