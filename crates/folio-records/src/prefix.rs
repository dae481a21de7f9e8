//! Rewrite prefix stripping

use crate::cache::ResolutionCache;
use folio_import_types::{EntityRepository, EntityScope, PathKey, StoreResult};
use std::sync::Arc;

/// Strips a content type's rewrite prefix from the leading path segment
///
/// Prefixes are fetched from the repository once per post type or taxonomy
/// and memoized for the rest of the run.
pub struct PrefixResolver {
    repository: Arc<dyn EntityRepository>,
    cache: ResolutionCache<Option<String>>,
}

impl PrefixResolver {
    pub fn new(repository: Arc<dyn EntityRepository>) -> Self {
        Self {
            repository,
            cache: ResolutionCache::new(),
        }
    }

    pub async fn prefix_for(&self, scope: &EntityScope) -> StoreResult<Option<String>> {
        self.cache
            .try_resolve(&scope.namespace(), || self.repository.rewrite_prefix(scope))
            .await
    }

    pub async fn remove_post_type_prefix(
        &self,
        path: &PathKey,
        post_type: &str,
    ) -> StoreResult<String> {
        self.remove(path, &EntityScope::Post(post_type.to_string()))
            .await
    }

    pub async fn remove_taxonomy_prefix(
        &self,
        path: &PathKey,
        taxonomy: &str,
    ) -> StoreResult<String> {
        self.remove(path, &EntityScope::Term(taxonomy.to_string()))
            .await
    }

    async fn remove(&self, path: &PathKey, scope: &EntityScope) -> StoreResult<String> {
        if path.is_root() {
            return Ok(path.as_str().to_string());
        }
        let prefix = self.prefix_for(scope).await?;
        Ok(path.remove_prefix(prefix.as_deref()))
    }

    pub fn clear(&self) {
        self.cache.clear();
    }
}
