//! `EntityRepository` over the sea-orm models
//!
//! Columns hold the fields the store understands (slug, parent, title, ...);
//! every other field of a post, term or user is kept in its `fields` JSON
//! column and returned as-is, so values read back compare equal to the
//! values written.

use crate::DbConnection;
use argon2::password_hash::{rand_core::OsRng, PasswordHash, SaltString};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use folio_entities::content_types::{self, ContentTypeKind};
use folio_entities::{entity_meta, posts, settings, terms, users};
use folio_import_types::{
    value_text, Entity, EntityRepository, EntityScope, StoreError, StoreResult, StoredMetadata,
};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::debug;

fn db_err(e: DbErr) -> StoreError {
    StoreError::Database(e.to_string())
}

fn to_db_id(id: i64) -> StoreResult<i32> {
    i32::try_from(id).map_err(|_| StoreError::Rejected(format!("id {} is out of range", id)))
}

fn parent_id(value: &Value) -> StoreResult<i32> {
    let id = match value {
        Value::Null => Some(0),
        Value::Number(n) => n.as_i64(),
        Value::String(s) if s.trim().is_empty() => Some(0),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    match id {
        Some(id) => to_db_id(id),
        None => Err(StoreError::Rejected(format!("invalid parent: {}", value))),
    }
}

fn optional_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        other => Some(value_text(other)),
    }
}

fn object(value: &Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

fn hash_password(password: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| StoreError::Rejected(format!("failed to hash password: {}", e)))
}

fn post_entity(model: posts::Model) -> Entity {
    let mut fields = Map::new();
    fields.insert("slug".to_string(), Value::String(model.slug));
    fields.insert("type".to_string(), Value::String(model.post_type));
    fields.insert("parent".to_string(), Value::from(model.parent_id));
    if let Some(title) = model.title {
        fields.insert("title".to_string(), Value::String(title));
    }
    if let Some(body) = model.body {
        fields.insert("body".to_string(), Value::String(body));
    }
    fields.extend(object(&model.fields));
    Entity::new(model.id.into(), fields)
}

fn term_entity(model: terms::Model) -> Entity {
    let mut fields = Map::new();
    fields.insert("slug".to_string(), Value::String(model.slug));
    fields.insert("taxonomy".to_string(), Value::String(model.taxonomy));
    fields.insert("name".to_string(), Value::String(model.name));
    fields.insert("parent".to_string(), Value::from(model.parent_id));
    if let Some(description) = model.description {
        fields.insert("description".to_string(), Value::String(description));
    }
    fields.extend(object(&model.fields));
    Entity::new(model.id.into(), fields)
}

fn user_entity(model: users::Model) -> Entity {
    let mut fields = Map::new();
    fields.insert("login".to_string(), Value::String(model.login));
    fields.insert("email".to_string(), Value::String(model.email));
    fields.insert("roles".to_string(), model.roles);
    fields.extend(object(&model.fields));
    Entity::new(model.id.into(), fields)
}

fn apply_post(
    model: &mut posts::ActiveModel,
    extras: &mut Map<String, Value>,
    fields: &Map<String, Value>,
) -> StoreResult<()> {
    for (key, value) in fields {
        match key.as_str() {
            // The post type comes from the scope
            "id" | "type" => {}
            "slug" => model.slug = Set(value_text(value)),
            "parent" => model.parent_id = Set(parent_id(value)?),
            "title" => model.title = Set(optional_text(value)),
            "body" => model.body = Set(optional_text(value)),
            _ => {
                extras.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

fn apply_term(
    model: &mut terms::ActiveModel,
    extras: &mut Map<String, Value>,
    fields: &Map<String, Value>,
) -> StoreResult<()> {
    for (key, value) in fields {
        match key.as_str() {
            "id" | "taxonomy" => {}
            "slug" => model.slug = Set(value_text(value)),
            "name" => model.name = Set(value_text(value)),
            "parent" => model.parent_id = Set(parent_id(value)?),
            "description" => model.description = Set(optional_text(value)),
            _ => {
                extras.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

fn apply_user(
    model: &mut users::ActiveModel,
    extras: &mut Map<String, Value>,
    fields: &Map<String, Value>,
) -> StoreResult<()> {
    for (key, value) in fields {
        match key.as_str() {
            "id" => {}
            "login" => model.login = Set(value_text(value)),
            "email" => model.email = Set(value_text(value)),
            "password" => model.password_hash = Set(Some(hash_password(&value_text(value))?)),
            // A single role replaces the current roles
            "role" => model.roles = Set(Value::Array(vec![Value::String(value_text(value))])),
            "roles" => match value {
                Value::Array(_) => model.roles = Set(value.clone()),
                other => {
                    return Err(StoreError::Rejected(format!(
                        "roles must be an array, found {}",
                        other
                    )))
                }
            },
            _ => {
                extras.insert(key.clone(), value.clone());
            }
        }
    }
    Ok(())
}

/// Non-blank text of a required creation field
fn required(fields: &Map<String, Value>, key: &str, scope: &EntityScope) -> StoreResult<String> {
    fields
        .get(key)
        .map(value_text)
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .ok_or_else(|| StoreError::Rejected(format!("{} requires a {}", scope, key)))
}

/// SQL content store
#[derive(Clone)]
pub struct SeaOrmRepository {
    db: Arc<DbConnection>,
}

impl SeaOrmRepository {
    pub fn new(db: Arc<DbConnection>) -> Self {
        Self { db }
    }

    pub fn connection(&self) -> &DbConnection {
        self.db.as_ref()
    }

    /// Register a post type or taxonomy, replacing its rewrite prefix
    pub async fn register_content_type(
        &self,
        kind: ContentTypeKind,
        name: &str,
        rewrite_prefix: Option<&str>,
    ) -> StoreResult<()> {
        let prefix = rewrite_prefix
            .map(|prefix| prefix.trim_matches('/').to_string())
            .filter(|prefix| !prefix.is_empty());

        let existing = content_types::Entity::find()
            .filter(content_types::Column::Kind.eq(kind))
            .filter(content_types::Column::Name.eq(name))
            .one(self.connection())
            .await
            .map_err(db_err)?;

        match existing {
            Some(model) => {
                let mut active: content_types::ActiveModel = model.into();
                active.rewrite_prefix = Set(prefix);
                active.update(self.connection()).await.map_err(db_err)?;
            }
            None => {
                content_types::ActiveModel {
                    kind: Set(kind),
                    name: Set(name.to_string()),
                    rewrite_prefix: Set(prefix),
                    ..Default::default()
                }
                .insert(self.connection())
                .await
                .map_err(db_err)?;
            }
        }

        debug!("Registered {:?} {}", kind, name);
        Ok(())
    }

    /// Set or clear the post served at the site root
    pub async fn set_front_page(&self, id: Option<i64>) -> StoreResult<()> {
        let existing = settings::Entity::find_by_id(settings::FRONT_PAGE.to_string())
            .one(self.connection())
            .await
            .map_err(db_err)?;

        match (existing, id) {
            (Some(model), None) => {
                settings::Entity::delete_by_id(model.key)
                    .exec(self.connection())
                    .await
                    .map_err(db_err)?;
            }
            (Some(model), Some(id)) => {
                let mut active: settings::ActiveModel = model.into();
                active.value = Set(id.to_string());
                active.update(self.connection()).await.map_err(db_err)?;
            }
            (None, Some(id)) => {
                settings::ActiveModel {
                    key: Set(settings::FRONT_PAGE.to_string()),
                    value: Set(id.to_string()),
                }
                .insert(self.connection())
                .await
                .map_err(db_err)?;
            }
            (None, None) => {}
        }
        Ok(())
    }

    /// Check a password against the stored hash of a user
    pub async fn verify_password(&self, login: &str, password: &str) -> StoreResult<bool> {
        let user = users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(self.connection())
            .await
            .map_err(db_err)?
            .ok_or_else(|| StoreError::NotFound(format!("user {}", login)))?;

        let Some(hash) = user.password_hash else {
            return Ok(false);
        };
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| StoreError::Database(format!("invalid password hash: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    }

    async fn find_post(&self, post_type: &str, parent: i32, slug: &str) -> StoreResult<Option<posts::Model>> {
        posts::Entity::find()
            .filter(posts::Column::PostType.eq(post_type))
            .filter(posts::Column::ParentId.eq(parent))
            .filter(posts::Column::Slug.eq(slug))
            .one(self.connection())
            .await
            .map_err(db_err)
    }

    async fn find_term(&self, taxonomy: &str, slug: &str) -> StoreResult<Option<terms::Model>> {
        terms::Entity::find()
            .filter(terms::Column::Taxonomy.eq(taxonomy))
            .filter(terms::Column::Slug.eq(slug))
            .one(self.connection())
            .await
            .map_err(db_err)
    }

    async fn find_user(&self, login: &str) -> StoreResult<Option<users::Model>> {
        users::Entity::find()
            .filter(users::Column::Login.eq(login))
            .one(self.connection())
            .await
            .map_err(db_err)
    }

    async fn post_model(&self, post_type: &str, id: i64) -> StoreResult<Option<posts::Model>> {
        Ok(posts::Entity::find_by_id(to_db_id(id)?)
            .one(self.connection())
            .await
            .map_err(db_err)?
            .filter(|model| model.post_type == post_type))
    }

    async fn term_model(&self, taxonomy: &str, id: i64) -> StoreResult<Option<terms::Model>> {
        Ok(terms::Entity::find_by_id(to_db_id(id)?)
            .one(self.connection())
            .await
            .map_err(db_err)?
            .filter(|model| model.taxonomy == taxonomy))
    }

    async fn user_model(&self, id: i64) -> StoreResult<Option<users::Model>> {
        users::Entity::find_by_id(to_db_id(id)?)
            .one(self.connection())
            .await
            .map_err(db_err)
    }

    async fn create_post(&self, post_type: &str, fields: &Map<String, Value>) -> StoreResult<Entity> {
        let scope = EntityScope::Post(post_type.to_string());
        let slug = required(fields, "slug", &scope)?;

        let mut model = posts::ActiveModel {
            post_type: Set(post_type.to_string()),
            parent_id: Set(0),
            title: Set(None),
            body: Set(None),
            ..Default::default()
        };
        let mut extras = Map::new();
        apply_post(&mut model, &mut extras, fields)?;
        model.fields = Set(Value::Object(extras));

        let parent = match &model.parent_id {
            Set(parent) => *parent,
            _ => 0,
        };
        if self.find_post(post_type, parent, &slug).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "{} with slug {} already exists under parent {}",
                scope, slug, parent
            )));
        }

        let model = model.insert(self.connection()).await.map_err(db_err)?;
        debug!("Created {} #{}", scope, model.id);
        Ok(post_entity(model))
    }

    async fn create_term(&self, taxonomy: &str, fields: &Map<String, Value>) -> StoreResult<Entity> {
        let scope = EntityScope::Term(taxonomy.to_string());
        let slug = required(fields, "slug", &scope)?;
        required(fields, "name", &scope)?;

        if self.find_term(taxonomy, &slug).await?.is_some() {
            return Err(StoreError::Conflict(format!(
                "{} with slug {} already exists",
                scope, slug
            )));
        }

        let mut model = terms::ActiveModel {
            taxonomy: Set(taxonomy.to_string()),
            parent_id: Set(0),
            description: Set(None),
            ..Default::default()
        };
        let mut extras = Map::new();
        apply_term(&mut model, &mut extras, fields)?;
        model.fields = Set(Value::Object(extras));

        let model = model.insert(self.connection()).await.map_err(db_err)?;
        debug!("Created {} #{}", scope, model.id);
        Ok(term_entity(model))
    }

    async fn create_user(&self, fields: &Map<String, Value>) -> StoreResult<Entity> {
        let scope = EntityScope::User;
        let login = required(fields, "login", &scope)?;
        required(fields, "email", &scope)?;

        if self.find_user(&login).await?.is_some() {
            return Err(StoreError::Conflict(format!("user {} already exists", login)));
        }

        let mut model = users::ActiveModel {
            password_hash: Set(None),
            roles: Set(Value::Array(Vec::new())),
            ..Default::default()
        };
        let mut extras = Map::new();
        apply_user(&mut model, &mut extras, fields)?;
        model.fields = Set(Value::Object(extras));

        let model = model.insert(self.connection()).await.map_err(db_err)?;
        debug!("Created user #{}", model.id);
        Ok(user_entity(model))
    }
}

#[async_trait]
impl EntityRepository for SeaOrmRepository {
    async fn find_by_key(&self, scope: &EntityScope, key: &str) -> StoreResult<Option<Entity>> {
        match scope {
            EntityScope::Post(post_type) => {
                let mut current: Option<posts::Model> = None;
                for slug in key.split('/').filter(|segment| !segment.is_empty()) {
                    let parent = current.as_ref().map_or(0, |model| model.id);
                    current = self.find_post(post_type, parent, slug).await?;
                    if current.is_none() {
                        break;
                    }
                }
                Ok(current.map(post_entity))
            }
            EntityScope::Term(taxonomy) => Ok(self.find_term(taxonomy, key).await?.map(term_entity)),
            EntityScope::User => Ok(self.find_user(key).await?.map(user_entity)),
        }
    }

    async fn find_by_id(&self, scope: &EntityScope, id: i64) -> StoreResult<Option<Entity>> {
        match scope {
            EntityScope::Post(post_type) => Ok(self.post_model(post_type, id).await?.map(post_entity)),
            EntityScope::Term(taxonomy) => Ok(self.term_model(taxonomy, id).await?.map(term_entity)),
            EntityScope::User => Ok(self.user_model(id).await?.map(user_entity)),
        }
    }

    async fn create(&self, scope: &EntityScope, fields: &Map<String, Value>) -> StoreResult<Entity> {
        match scope {
            EntityScope::Post(post_type) => self.create_post(post_type, fields).await,
            EntityScope::Term(taxonomy) => self.create_term(taxonomy, fields).await,
            EntityScope::User => self.create_user(fields).await,
        }
    }

    async fn update(
        &self,
        scope: &EntityScope,
        id: i64,
        fields: &Map<String, Value>,
    ) -> StoreResult<Entity> {
        let not_found = || StoreError::NotFound(format!("{} #{}", scope, id));

        let entity = match scope {
            EntityScope::Post(post_type) => {
                let model = self.post_model(post_type, id).await?.ok_or_else(not_found)?;
                let mut extras = object(&model.fields);
                let mut active: posts::ActiveModel = model.into();
                apply_post(&mut active, &mut extras, fields)?;
                active.fields = Set(Value::Object(extras));
                post_entity(active.update(self.connection()).await.map_err(db_err)?)
            }
            EntityScope::Term(taxonomy) => {
                let model = self.term_model(taxonomy, id).await?.ok_or_else(not_found)?;
                let mut extras = object(&model.fields);
                let mut active: terms::ActiveModel = model.into();
                apply_term(&mut active, &mut extras, fields)?;
                active.fields = Set(Value::Object(extras));
                term_entity(active.update(self.connection()).await.map_err(db_err)?)
            }
            EntityScope::User => {
                let model = self.user_model(id).await?.ok_or_else(not_found)?;
                let mut extras = object(&model.fields);
                let mut active: users::ActiveModel = model.into();
                apply_user(&mut active, &mut extras, fields)?;
                active.fields = Set(Value::Object(extras));
                user_entity(active.update(self.connection()).await.map_err(db_err)?)
            }
        };

        debug!("Updated {} #{}", scope, id);
        Ok(entity)
    }

    async fn read_metadata(&self, scope: &EntityScope, id: i64) -> StoreResult<StoredMetadata> {
        let rows = entity_meta::Entity::find()
            .filter(entity_meta::Column::Namespace.eq(scope.namespace()))
            .filter(entity_meta::Column::EntityId.eq(to_db_id(id)?))
            .order_by_asc(entity_meta::Column::Id)
            .all(self.connection())
            .await
            .map_err(db_err)?;

        let mut metadata = StoredMetadata::new();
        for row in rows {
            metadata.entry(row.meta_key).or_default().push(row.meta_value);
        }
        Ok(metadata)
    }

    async fn write_metadata_entry(
        &self,
        scope: &EntityScope,
        id: i64,
        key: &str,
        value: &Value,
    ) -> StoreResult<()> {
        let entity_id = to_db_id(id)?;

        entity_meta::Entity::delete_many()
            .filter(entity_meta::Column::Namespace.eq(scope.namespace()))
            .filter(entity_meta::Column::EntityId.eq(entity_id))
            .filter(entity_meta::Column::MetaKey.eq(key))
            .exec(self.connection())
            .await
            .map_err(db_err)?;

        entity_meta::ActiveModel {
            namespace: Set(scope.namespace()),
            entity_id: Set(entity_id),
            meta_key: Set(key.to_string()),
            meta_value: Set(value_text(value)),
            ..Default::default()
        }
        .insert(self.connection())
        .await
        .map_err(db_err)?;

        Ok(())
    }

    async fn rewrite_prefix(&self, scope: &EntityScope) -> StoreResult<Option<String>> {
        let (kind, name) = match scope {
            EntityScope::Post(post_type) => (ContentTypeKind::PostType, post_type),
            EntityScope::Term(taxonomy) => (ContentTypeKind::Taxonomy, taxonomy),
            EntityScope::User => return Ok(None),
        };

        let content_type = content_types::Entity::find()
            .filter(content_types::Column::Kind.eq(kind))
            .filter(content_types::Column::Name.eq(name.as_str()))
            .one(self.connection())
            .await
            .map_err(db_err)?;

        Ok(content_type.and_then(|model| model.rewrite_prefix))
    }

    async fn front_page(&self) -> StoreResult<Option<i64>> {
        let setting = settings::Entity::find_by_id(settings::FRONT_PAGE.to_string())
            .one(self.connection())
            .await
            .map_err(db_err)?;

        Ok(setting.and_then(|model| model.value.trim().parse().ok()))
    }
}
