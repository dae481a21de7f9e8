//! Generic reconciliation engine

use crate::context::ResolutionContext;
use crate::kind::{EntityKind, PostKind, TermKind, UserKind};
use folio_import_types::{value_text, Entity, FieldSet, SaveStatus, StoreResult};
use serde_json::{Map, Value};
use tracing::{debug, warn};

pub type PostRecord = EntityRecord<PostKind>;
pub type TermRecord = EntityRecord<TermKind>;
pub type UserRecord = EntityRecord<UserKind>;

/// One entity being reconciled against the store
///
/// Collects pending fields, resolves the existing entity (and its parent)
/// through the shared cache and issues at most one create or update.
pub struct EntityRecord<K: EntityKind> {
    kind: K,
    key: K::Key,
    ctx: ResolutionContext,
    fields: FieldSet,
    entity: Option<Entity>,
    parent: Option<Option<Entity>>,
}

impl<K: EntityKind> EntityRecord<K> {
    pub fn new(kind: K, key: K::Key, ctx: ResolutionContext) -> Self {
        Self {
            kind,
            key,
            ctx,
            fields: FieldSet::new(),
            entity: None,
            parent: None,
        }
    }

    pub fn key(&self) -> &K::Key {
        &self.key
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Merge fields, last write wins
    pub fn set(&mut self, fields: Map<String, Value>) -> &mut Self {
        self.fields.set(fields);
        self
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.fields.set_field(key, value);
        self
    }

    pub fn set_metadata(&mut self, metadata: Map<String, Value>) -> &mut Self {
        self.fields.set_metadata(metadata);
        self
    }

    /// Entity resolved by the last `find` or written by the last `save`
    pub fn entity(&self) -> Option<&Entity> {
        self.entity.as_ref()
    }

    /// Parent resolved by the last `find_parent`
    pub fn parent(&self) -> Option<&Entity> {
        self.parent.as_ref().and_then(Option::as_ref)
    }

    pub async fn find(&mut self) -> StoreResult<Option<Entity>> {
        if let Some(entity) = &self.entity {
            return Ok(Some(entity.clone()));
        }

        let found = {
            let (kind, ctx, key) = (&self.kind, &self.ctx, &self.key);
            let cache_key = kind.cache_key(ctx, key).await?;
            ctx.entities()
                .try_resolve(&cache_key, || kind.lookup(ctx, key))
                .await?
        };
        self.entity = found.clone();
        Ok(found)
    }

    pub async fn find_parent(&mut self) -> StoreResult<Option<Entity>> {
        if let Some(parent) = &self.parent {
            return Ok(parent.clone());
        }

        let parent = match self.kind.parent_key(&self.key) {
            Some(parent_key) => {
                let (kind, ctx) = (&self.kind, &self.ctx);
                let cache_key = kind.cache_key(ctx, &parent_key).await?;
                ctx.entities()
                    .try_resolve(&cache_key, || kind.lookup(ctx, &parent_key))
                    .await?
            }
            None => None,
        };
        self.parent = Some(parent.clone());
        Ok(parent)
    }

    pub async fn exists(&mut self) -> StoreResult<bool> {
        Ok(self.find().await?.is_some())
    }

    /// Reconcile the pending fields with the store
    ///
    /// Never fails: validation and store errors are reported as `Failed`.
    pub async fn save(&mut self) -> SaveStatus {
        match self.try_save().await {
            Ok(status) => {
                debug!(
                    "{} {} -> {}",
                    self.kind.scope(),
                    self.key,
                    status.label()
                );
                status
            }
            Err(e) => {
                warn!("Failed to save {} {}: {}", self.kind.scope(), self.key, e);
                SaveStatus::Failed
            }
        }
    }

    async fn try_save(&mut self) -> StoreResult<SaveStatus> {
        let existing = self.find().await?;

        if existing.is_none() && !self.has_required_content() {
            warn!(
                "{} {} has none of the required fields {:?}",
                self.kind.scope(),
                self.key,
                self.kind.required_fields()
            );
            return Ok(SaveStatus::Failed);
        }

        if let Some(entity) = &existing {
            if self.fields.is_empty() || !self.has_changed(entity).await? {
                return Ok(SaveStatus::Noop);
            }
        }

        let parent = self.find_parent().await?;
        self.kind
            .prepare(
                &self.ctx,
                &self.key,
                &mut self.fields,
                existing.as_ref(),
                parent.as_ref(),
            )
            .await?;

        let cache_key = self.kind.cache_key(&self.ctx, &self.key).await?;
        let repository = self.ctx.repository();
        let scope = self.kind.scope();
        let written = match &existing {
            Some(entity) => {
                repository
                    .update(&scope, entity.id, self.fields.fields())
                    .await?
            }
            None => repository.create(&scope, self.fields.fields()).await?,
        };

        // Cache the created entity before the follow-up store calls
        if existing.is_none() {
            self.ctx
                .entities()
                .put(&cache_key, Some(written.clone()));
        }
        self.entity = Some(written.clone());

        for (key, value) in self.fields.metadata() {
            repository
                .write_metadata_entry(&scope, written.id, key, value)
                .await?;
        }

        let canonical = repository
            .find_by_id(&scope, written.id)
            .await?
            .unwrap_or(written);

        if existing.is_none() {
            self.ctx
                .entities()
                .put(&cache_key, Some(canonical.clone()));
        }
        self.entity = Some(canonical);

        Ok(if existing.is_some() {
            SaveStatus::Updated
        } else {
            SaveStatus::Created
        })
    }

    fn has_required_content(&self) -> bool {
        self.kind
            .required_fields()
            .iter()
            .any(|field| self.fields.is_filled(field))
    }

    async fn has_changed(&self, existing: &Entity) -> StoreResult<bool> {
        if self.kind.has_changed_fields(&self.fields, existing) {
            return Ok(true);
        }
        self.has_changed_metadata(existing).await
    }

    /// Pending metadata differs when a key is missing from the store or its
    /// first stored value has different text
    async fn has_changed_metadata(&self, existing: &Entity) -> StoreResult<bool> {
        let pending = self.fields.metadata();
        if pending.is_empty() {
            return Ok(false);
        }

        let stored = self
            .ctx
            .repository()
            .read_metadata(&self.kind.scope(), existing.id)
            .await?;

        Ok(pending.iter().any(|(key, value)| {
            match stored.get(key).and_then(|values| values.first()) {
                Some(current) => *current != value_text(value),
                None => true,
            }
        }))
    }
}
