//! Seeding the content model from `folio.yaml`

use crate::SeaOrmRepository;
use folio_core::ImportConfig;
use folio_entities::content_types::ContentTypeKind;
use folio_import_types::{EntityRepository, EntityScope, StoreResult};
use tracing::{info, warn};

/// Post type the configured front page is looked up in
pub const FRONT_PAGE_POST_TYPE: &str = "page";

/// Register the configured rewrite prefixes and resolve the front page
///
/// A front page path that does not resolve to a page leaves the stored
/// front page untouched.
pub async fn apply_site_config(
    repository: &SeaOrmRepository,
    config: &ImportConfig,
) -> StoreResult<()> {
    for (post_type, prefix) in &config.rewrite_prefixes.post_types {
        repository
            .register_content_type(ContentTypeKind::PostType, post_type, Some(prefix))
            .await?;
    }
    for (taxonomy, prefix) in &config.rewrite_prefixes.taxonomies {
        repository
            .register_content_type(ContentTypeKind::Taxonomy, taxonomy, Some(prefix))
            .await?;
    }

    if let Some(path) = config.front_page.as_deref() {
        let scope = EntityScope::Post(FRONT_PAGE_POST_TYPE.to_string());
        match repository
            .find_by_key(&scope, path.trim_matches('/'))
            .await?
        {
            Some(page) => {
                repository.set_front_page(Some(page.id)).await?;
                info!("Front page set to {} (#{})", path, page.id);
            }
            None => warn!("Front page {} not found, keeping the current front page", path),
        }
    }

    Ok(())
}
