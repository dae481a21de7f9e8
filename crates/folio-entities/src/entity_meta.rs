use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One metadata value of a post, term or user
///
/// `namespace` is the entity scope (`post.page`, `term.category`, `user`).
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "entity_meta")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub namespace: String,
    pub entity_id: i32,
    pub meta_key: String,
    #[sea_orm(column_type = "Text")]
    pub meta_value: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
