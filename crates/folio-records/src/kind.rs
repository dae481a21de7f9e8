//! Per-kind resolution and preparation rules
//!
//! An `EntityKind` tells `EntityRecord` how to find an entity of its kind,
//! which fields make a new entity valid, which fields count as changed and
//! which reserved fields to inject before writing.

use crate::context::ResolutionContext;
use async_trait::async_trait;
use folio_import_types::{Entity, EntityScope, FieldSet, PathKey, StoreResult};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::Value;
use std::fmt::Display;

const GENERATED_PASSWORD_LENGTH: usize = 24;

#[async_trait]
pub trait EntityKind: Send + Sync {
    /// Natural key of a record (a path or a login)
    type Key: Clone + Display + Send + Sync;

    /// Log column holding the key
    const KEY_COLUMN: &'static str;

    fn scope(&self) -> EntityScope;

    /// A new entity needs a non-blank value for at least one of these
    fn required_fields(&self) -> &'static [&'static str];

    /// Shared cache key of a record; paths are keyed after prefix stripping
    async fn cache_key(&self, _ctx: &ResolutionContext, key: &Self::Key) -> StoreResult<String> {
        Ok(self.scope().cache_key(&key.to_string()))
    }

    /// Key of the hierarchical parent, if the kind has one
    fn parent_key(&self, _key: &Self::Key) -> Option<Self::Key> {
        None
    }

    /// Uncached lookup against the store
    async fn lookup(
        &self,
        ctx: &ResolutionContext,
        key: &Self::Key,
    ) -> StoreResult<Option<Entity>>;

    /// Whether any tracked pending field differs from the stored entity
    fn has_changed_fields(&self, fields: &FieldSet, existing: &Entity) -> bool {
        fields
            .fields()
            .iter()
            .any(|(key, value)| existing.field(key) != Some(value))
    }

    /// Inject reserved fields before the write
    async fn prepare(
        &self,
        ctx: &ResolutionContext,
        key: &Self::Key,
        fields: &mut FieldSet,
        existing: Option<&Entity>,
        parent: Option<&Entity>,
    ) -> StoreResult<()>;
}

/// Posts of one post type, keyed by hierarchical path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostKind {
    pub post_type: String,
}

impl PostKind {
    pub fn new(post_type: impl Into<String>) -> Self {
        Self {
            post_type: post_type.into(),
        }
    }
}

#[async_trait]
impl EntityKind for PostKind {
    type Key = PathKey;

    const KEY_COLUMN: &'static str = "path";

    fn scope(&self) -> EntityScope {
        EntityScope::Post(self.post_type.clone())
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["title", "body", "author"]
    }

    fn parent_key(&self, key: &PathKey) -> Option<PathKey> {
        key.parent()
    }

    async fn cache_key(&self, ctx: &ResolutionContext, key: &PathKey) -> StoreResult<String> {
        let path = ctx
            .prefixes()
            .remove_post_type_prefix(key, &self.post_type)
            .await?;
        Ok(self.scope().cache_key(&path))
    }

    async fn lookup(&self, ctx: &ResolutionContext, key: &PathKey) -> StoreResult<Option<Entity>> {
        let repository = ctx.repository();
        let scope = self.scope();

        if key.is_root() {
            return match repository.front_page().await? {
                Some(id) => repository.find_by_id(&scope, id).await,
                None => Ok(None),
            };
        }

        let path = ctx
            .prefixes()
            .remove_post_type_prefix(key, &self.post_type)
            .await?;
        if path.is_empty() {
            return Ok(None);
        }
        repository.find_by_key(&scope, &path).await
    }

    async fn prepare(
        &self,
        ctx: &ResolutionContext,
        key: &PathKey,
        fields: &mut FieldSet,
        existing: Option<&Entity>,
        parent: Option<&Entity>,
    ) -> StoreResult<()> {
        if let Some(existing) = existing {
            fields.set_field("id", existing.id);
        }
        if !key.is_root() {
            let path = ctx
                .prefixes()
                .remove_post_type_prefix(key, &self.post_type)
                .await?;
            let slug = path
                .rsplit('/')
                .next()
                .filter(|slug| !slug.is_empty())
                .unwrap_or_else(|| key.last_segment());
            fields.set_field("slug", slug);
        }
        fields.set_field("type", self.post_type.as_str());
        fields.set_field("parent", parent.map_or(0, |parent| parent.id));
        Ok(())
    }
}

/// Terms of one taxonomy, keyed by path; the last segment is the slug
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermKind {
    pub taxonomy: String,
}

impl TermKind {
    /// Fields compared when deciding whether a term changed
    pub const TRACKED_FIELDS: [&'static str; 4] = ["name", "slug", "parent", "description"];

    pub fn new(taxonomy: impl Into<String>) -> Self {
        Self {
            taxonomy: taxonomy.into(),
        }
    }

    async fn slug(&self, ctx: &ResolutionContext, key: &PathKey) -> StoreResult<Option<String>> {
        if key.is_root() {
            return Ok(None);
        }
        let path = ctx
            .prefixes()
            .remove_taxonomy_prefix(key, &self.taxonomy)
            .await?;
        Ok(path
            .rsplit('/')
            .next()
            .filter(|slug| !slug.is_empty())
            .map(str::to_string))
    }
}

#[async_trait]
impl EntityKind for TermKind {
    type Key = PathKey;

    const KEY_COLUMN: &'static str = "path";

    fn scope(&self) -> EntityScope {
        EntityScope::Term(self.taxonomy.clone())
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["name"]
    }

    fn parent_key(&self, key: &PathKey) -> Option<PathKey> {
        key.parent()
    }

    async fn cache_key(&self, ctx: &ResolutionContext, key: &PathKey) -> StoreResult<String> {
        let path = ctx
            .prefixes()
            .remove_taxonomy_prefix(key, &self.taxonomy)
            .await?;
        Ok(self.scope().cache_key(&path))
    }

    async fn lookup(&self, ctx: &ResolutionContext, key: &PathKey) -> StoreResult<Option<Entity>> {
        match self.slug(ctx, key).await? {
            Some(slug) => ctx.repository().find_by_key(&self.scope(), &slug).await,
            None => Ok(None),
        }
    }

    fn has_changed_fields(&self, fields: &FieldSet, existing: &Entity) -> bool {
        Self::TRACKED_FIELDS.iter().any(|key| match fields.get(key) {
            Some(value) => existing.field(key) != Some(value),
            None => false,
        })
    }

    async fn prepare(
        &self,
        ctx: &ResolutionContext,
        key: &PathKey,
        fields: &mut FieldSet,
        existing: Option<&Entity>,
        parent: Option<&Entity>,
    ) -> StoreResult<()> {
        if let Some(existing) = existing {
            fields.set_field("id", existing.id);
        }
        if let Some(slug) = self.slug(ctx, key).await? {
            fields.set_field("slug", slug);
        }
        if let Some(parent) = parent {
            fields.set_field("parent", parent.id);
        }
        Ok(())
    }
}

/// User accounts, keyed by login
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserKind;

#[async_trait]
impl EntityKind for UserKind {
    type Key = String;

    const KEY_COLUMN: &'static str = "login";

    fn scope(&self) -> EntityScope {
        EntityScope::User
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["login", "email", "role"]
    }

    async fn lookup(&self, ctx: &ResolutionContext, login: &String) -> StoreResult<Option<Entity>> {
        ctx.repository().find_by_key(&self.scope(), login).await
    }

    /// Every field but `role` is compared directly; a supplied role counts
    /// as changed when the user does not already hold it
    fn has_changed_fields(&self, fields: &FieldSet, existing: &Entity) -> bool {
        let changed = fields
            .fields()
            .iter()
            .filter(|(key, _)| key.as_str() != "role")
            .any(|(key, value)| existing.field(key) != Some(value));

        let role_changed = match fields.get("role").and_then(Value::as_str) {
            Some(role) => !existing.roles().contains(&role),
            None => false,
        };

        changed || role_changed
    }

    async fn prepare(
        &self,
        _ctx: &ResolutionContext,
        login: &String,
        fields: &mut FieldSet,
        existing: Option<&Entity>,
        _parent: Option<&Entity>,
    ) -> StoreResult<()> {
        match existing {
            Some(existing) => fields.set_field("id", existing.id),
            None => fields.set_field("password", generate_password()),
        }
        fields.set_field("login", login.as_str());
        Ok(())
    }
}

/// Random alphanumeric credential for newly created accounts
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LENGTH)
        .map(char::from)
        .collect()
}
