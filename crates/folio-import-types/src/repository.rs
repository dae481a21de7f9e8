//! Persistence store abstraction

use crate::error::StoreResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// Stored metadata: key to all values recorded under it
pub type StoredMetadata = HashMap<String, Vec<String>>;

/// Which family of entities an operation targets
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "lowercase")]
pub enum EntityScope {
    /// Posts of one post type (`page`, `post`, custom types)
    Post(String),
    /// Terms of one taxonomy
    Term(String),
    User,
}

impl EntityScope {
    /// Cache namespace: `post.<type>`, `term.<taxonomy>` or `user`
    pub fn namespace(&self) -> String {
        match self {
            EntityScope::Post(post_type) => format!("post.{}", post_type),
            EntityScope::Term(taxonomy) => format!("term.{}", taxonomy),
            EntityScope::User => "user".to_string(),
        }
    }

    /// Compose a cache key within this scope
    pub fn cache_key(&self, key: &str) -> String {
        format!("{}:{}", self.namespace(), key)
    }
}

impl std::fmt::Display for EntityScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.namespace())
    }
}

/// An entity as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub fields: Map<String, Value>,
}

impl Entity {
    pub fn new(id: i64, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Role names stored on a user entity
    pub fn roles(&self) -> Vec<&str> {
        match self.fields.get("roles") {
            Some(Value::Array(roles)) => roles.iter().filter_map(Value::as_str).collect(),
            Some(Value::String(role)) => vec![role.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Content store the reconciliation engine reads from and writes to
///
/// Keys passed to `find_by_key` are scope specific: the hierarchical slug
/// path for posts (prefix already stripped), the slug for terms and the
/// login for users.
#[async_trait]
pub trait EntityRepository: Send + Sync {
    async fn find_by_key(&self, scope: &EntityScope, key: &str) -> StoreResult<Option<Entity>>;

    async fn find_by_id(&self, scope: &EntityScope, id: i64) -> StoreResult<Option<Entity>>;

    async fn create(&self, scope: &EntityScope, fields: &Map<String, Value>)
        -> StoreResult<Entity>;

    /// Apply `fields` to an existing entity; fields not supplied are kept
    async fn update(
        &self,
        scope: &EntityScope,
        id: i64,
        fields: &Map<String, Value>,
    ) -> StoreResult<Entity>;

    async fn read_metadata(&self, scope: &EntityScope, id: i64) -> StoreResult<StoredMetadata>;

    /// Replace the value stored under `key`
    async fn write_metadata_entry(
        &self,
        scope: &EntityScope,
        id: i64,
        key: &str,
        value: &Value,
    ) -> StoreResult<()>;

    /// Registered rewrite prefix of a post type or taxonomy
    async fn rewrite_prefix(&self, scope: &EntityScope) -> StoreResult<Option<String>>;

    /// Id of the post served at the site root
    async fn front_page(&self) -> StoreResult<Option<i64>>;
}
