//! In-memory `EntityRepository` for tests
//!
//! Mirrors the SQL store's field conventions (posts resolve by slug
//! hierarchy, users expose `roles`, passwords are never returned) and counts
//! calls so tests can assert on cache behavior.

use async_trait::async_trait;
use folio_import_types::{
    Entity, EntityRepository, EntityScope, StoreError, StoreResult, StoredMetadata,
};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
struct State {
    next_id: i64,
    entities: Vec<(EntityScope, Entity)>,
    metadata: HashMap<(EntityScope, i64), StoredMetadata>,
    prefixes: HashMap<EntityScope, String>,
    front_page: Option<i64>,
}

#[derive(Default)]
pub struct MemoryRepository {
    state: Mutex<State>,
    key_lookups: AtomicUsize,
    prefix_lookups: AtomicUsize,
    metadata_reads: AtomicUsize,
    writes: AtomicUsize,
    fail_writes: AtomicBool,
    fail_metadata_writes: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entity directly, bypassing counters
    pub fn seed(&self, scope: &EntityScope, fields: Value) -> Entity {
        let fields = match fields {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let mut state = self.state.lock();
        Self::insert(&mut state, scope, &fields)
    }

    pub fn seed_metadata(&self, scope: &EntityScope, id: i64, key: &str, value: &str) {
        self.state
            .lock()
            .metadata
            .entry((scope.clone(), id))
            .or_default()
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn set_prefix(&self, scope: &EntityScope, prefix: &str) {
        self.state
            .lock()
            .prefixes
            .insert(scope.clone(), prefix.to_string());
    }

    pub fn set_front_page(&self, id: Option<i64>) {
        self.state.lock().front_page = id;
    }

    /// Make every subsequent write fail with `StoreError::Rejected`
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make only `write_metadata_entry` fail, after entity writes succeed
    pub fn fail_metadata_writes(&self, fail: bool) {
        self.fail_metadata_writes.store(fail, Ordering::SeqCst);
    }

    pub fn entity(&self, scope: &EntityScope, id: i64) -> Option<Entity> {
        Self::by_id(&self.state.lock(), scope, id)
    }

    pub fn entities(&self, scope: &EntityScope) -> Vec<Entity> {
        self.state
            .lock()
            .entities
            .iter()
            .filter(|(entity_scope, _)| entity_scope == scope)
            .map(|(_, entity)| entity.clone())
            .collect()
    }

    pub fn metadata(&self, scope: &EntityScope, id: i64) -> StoredMetadata {
        self.state
            .lock()
            .metadata
            .get(&(scope.clone(), id))
            .cloned()
            .unwrap_or_default()
    }

    /// Calls to `find_by_key`
    pub fn key_lookups(&self) -> usize {
        self.key_lookups.load(Ordering::SeqCst)
    }

    pub fn prefix_lookups(&self) -> usize {
        self.prefix_lookups.load(Ordering::SeqCst)
    }

    pub fn metadata_reads(&self) -> usize {
        self.metadata_reads.load(Ordering::SeqCst)
    }

    /// Calls to `create`, `update` and `write_metadata_entry`
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> StoreResult<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected("writes disabled".to_string()));
        }
        Ok(())
    }

    fn by_id(state: &State, scope: &EntityScope, id: i64) -> Option<Entity> {
        state
            .entities
            .iter()
            .find(|(entity_scope, entity)| entity_scope == scope && entity.id == id)
            .map(|(_, entity)| entity.clone())
    }

    fn find_child(state: &State, scope: &EntityScope, parent: i64, slug: &str) -> Option<Entity> {
        state
            .entities
            .iter()
            .find(|(entity_scope, entity)| {
                entity_scope == scope
                    && entity.field("slug").and_then(Value::as_str) == Some(slug)
                    && entity.field("parent").and_then(Value::as_i64).unwrap_or(0) == parent
            })
            .map(|(_, entity)| entity.clone())
    }

    fn insert(state: &mut State, scope: &EntityScope, fields: &Map<String, Value>) -> Entity {
        state.next_id += 1;
        let mut entity = Entity::new(state.next_id, Map::new());
        Self::apply(scope, &mut entity, fields);
        state.entities.push((scope.clone(), entity.clone()));
        entity
    }

    fn apply(scope: &EntityScope, entity: &mut Entity, fields: &Map<String, Value>) {
        for (key, value) in fields {
            match (scope, key.as_str()) {
                (_, "id") | (EntityScope::User, "password") => {}
                (EntityScope::User, "role") => {
                    entity
                        .fields
                        .insert("roles".to_string(), Value::Array(vec![value.clone()]));
                }
                _ => {
                    entity.fields.insert(key.clone(), value.clone());
                }
            }
        }
    }
}

#[async_trait]
impl EntityRepository for MemoryRepository {
    async fn find_by_key(&self, scope: &EntityScope, key: &str) -> StoreResult<Option<Entity>> {
        self.key_lookups.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock();

        let found = match scope {
            EntityScope::Post(_) => {
                let mut current: Option<Entity> = None;
                for slug in key.split('/').filter(|segment| !segment.is_empty()) {
                    let parent = current.as_ref().map_or(0, |entity| entity.id);
                    current = Self::find_child(&state, scope, parent, slug);
                    if current.is_none() {
                        break;
                    }
                }
                current
            }
            EntityScope::Term(_) => state
                .entities
                .iter()
                .find(|(entity_scope, entity)| {
                    entity_scope == scope && entity.field("slug").and_then(Value::as_str) == Some(key)
                })
                .map(|(_, entity)| entity.clone()),
            EntityScope::User => state
                .entities
                .iter()
                .find(|(entity_scope, entity)| {
                    entity_scope == scope && entity.field("login").and_then(Value::as_str) == Some(key)
                })
                .map(|(_, entity)| entity.clone()),
        };
        Ok(found)
    }

    async fn find_by_id(&self, scope: &EntityScope, id: i64) -> StoreResult<Option<Entity>> {
        Ok(Self::by_id(&self.state.lock(), scope, id))
    }

    async fn create(&self, scope: &EntityScope, fields: &Map<String, Value>) -> StoreResult<Entity> {
        self.check_write()?;
        let mut state = self.state.lock();
        Ok(Self::insert(&mut state, scope, fields))
    }

    async fn update(
        &self,
        scope: &EntityScope,
        id: i64,
        fields: &Map<String, Value>,
    ) -> StoreResult<Entity> {
        self.check_write()?;
        let mut state = self.state.lock();
        let (_, entity) = state
            .entities
            .iter_mut()
            .find(|(entity_scope, entity)| entity_scope == scope && entity.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("{} #{}", scope, id)))?;
        Self::apply(scope, entity, fields);
        Ok(entity.clone())
    }

    async fn read_metadata(&self, scope: &EntityScope, id: i64) -> StoreResult<StoredMetadata> {
        self.metadata_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.metadata(scope, id))
    }

    async fn write_metadata_entry(
        &self,
        scope: &EntityScope,
        id: i64,
        key: &str,
        value: &Value,
    ) -> StoreResult<()> {
        self.check_write()?;
        if self.fail_metadata_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected(format!("metadata {} rejected", key)));
        }
        self.state
            .lock()
            .metadata
            .entry((scope.clone(), id))
            .or_default()
            .insert(key.to_string(), vec![folio_import_types::value_text(value)]);
        Ok(())
    }

    async fn rewrite_prefix(&self, scope: &EntityScope) -> StoreResult<Option<String>> {
        self.prefix_lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.state.lock().prefixes.get(scope).cloned())
    }

    async fn front_page(&self) -> StoreResult<Option<i64>> {
        Ok(self.state.lock().front_page)
    }
}
