use crate::cache::ResolutionCache;
use crate::prefix::PrefixResolver;
use folio_import_types::{Entity, EntityRepository};
use std::sync::Arc;

/// Shared state of one import run
///
/// Cloning is cheap; all clones see the same caches.
#[derive(Clone)]
pub struct ResolutionContext {
    repository: Arc<dyn EntityRepository>,
    entities: Arc<ResolutionCache<Option<Entity>>>,
    prefixes: Arc<PrefixResolver>,
}

impl ResolutionContext {
    pub fn new(repository: Arc<dyn EntityRepository>) -> Self {
        Self {
            prefixes: Arc::new(PrefixResolver::new(repository.clone())),
            entities: Arc::new(ResolutionCache::new()),
            repository,
        }
    }

    pub fn repository(&self) -> &dyn EntityRepository {
        self.repository.as_ref()
    }

    /// Resolved entities keyed by `<namespace>:<key>`
    pub fn entities(&self) -> &ResolutionCache<Option<Entity>> {
        &self.entities
    }

    pub fn prefixes(&self) -> &PrefixResolver {
        &self.prefixes
    }

    /// Forget everything resolved so far
    pub fn clear(&self) {
        self.entities.clear();
        self.prefixes.clear();
    }
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("cached_entities", &self.entities.len())
            .finish()
    }
}
