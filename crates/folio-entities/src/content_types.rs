use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of a registered content type
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ContentTypeKind {
    #[sea_orm(string_value = "post_type")]
    PostType,
    #[sea_orm(string_value = "taxonomy")]
    Taxonomy,
}

/// A registered post type or taxonomy and its rewrite prefix
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "content_types")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub kind: ContentTypeKind,
    pub name: String,
    pub rewrite_prefix: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
