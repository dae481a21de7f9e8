use sea_orm_migration::prelude::*;

/// Content store: posts, terms, users, their metadata, registered content
/// types and site settings
#[derive(DeriveMigrationName)]
pub struct Migration;

fn id_column() -> ColumnDef {
    ColumnDef::new(Alias::new("id"))
        .integer()
        .not_null()
        .auto_increment()
        .primary_key()
        .to_owned()
}

fn timestamp_columns(table: &mut TableCreateStatement) -> &mut TableCreateStatement {
    table
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp_with_time_zone()
                .not_null(),
        )
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create posts table
        manager
            .create_table(
                timestamp_columns(
                    Table::create()
                        .table(Alias::new("posts"))
                        .if_not_exists()
                        .col(id_column())
                        .col(ColumnDef::new(Alias::new("post_type")).string().not_null())
                        .col(ColumnDef::new(Alias::new("slug")).string().not_null())
                        .col(
                            ColumnDef::new(Alias::new("parent_id"))
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Alias::new("title")).string().null())
                        .col(ColumnDef::new(Alias::new("body")).text().null())
                        .col(ColumnDef::new(Alias::new("fields")).json().not_null()),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_posts_type_parent_slug")
                    .table(Alias::new("posts"))
                    .col(Alias::new("post_type"))
                    .col(Alias::new("parent_id"))
                    .col(Alias::new("slug"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create terms table
        manager
            .create_table(
                timestamp_columns(
                    Table::create()
                        .table(Alias::new("terms"))
                        .if_not_exists()
                        .col(id_column())
                        .col(ColumnDef::new(Alias::new("taxonomy")).string().not_null())
                        .col(ColumnDef::new(Alias::new("slug")).string().not_null())
                        .col(ColumnDef::new(Alias::new("name")).string().not_null())
                        .col(
                            ColumnDef::new(Alias::new("parent_id"))
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Alias::new("description")).text().null())
                        .col(ColumnDef::new(Alias::new("fields")).json().not_null()),
                )
                .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_terms_taxonomy_slug")
                    .table(Alias::new("terms"))
                    .col(Alias::new("taxonomy"))
                    .col(Alias::new("slug"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                timestamp_columns(
                    Table::create()
                        .table(Alias::new("users"))
                        .if_not_exists()
                        .col(id_column())
                        .col(
                            ColumnDef::new(Alias::new("login"))
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Alias::new("email")).string().not_null())
                        .col(ColumnDef::new(Alias::new("password_hash")).string().null())
                        .col(ColumnDef::new(Alias::new("roles")).json().not_null())
                        .col(ColumnDef::new(Alias::new("fields")).json().not_null()),
                )
                .to_owned(),
            )
            .await?;

        // Create entity_meta table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("entity_meta"))
                    .if_not_exists()
                    .col(id_column())
                    .col(ColumnDef::new(Alias::new("namespace")).string().not_null())
                    .col(ColumnDef::new(Alias::new("entity_id")).integer().not_null())
                    .col(ColumnDef::new(Alias::new("meta_key")).string().not_null())
                    .col(ColumnDef::new(Alias::new("meta_value")).text().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_entity_meta_entity")
                    .table(Alias::new("entity_meta"))
                    .col(Alias::new("namespace"))
                    .col(Alias::new("entity_id"))
                    .to_owned(),
            )
            .await?;

        // Create content_types table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("content_types"))
                    .if_not_exists()
                    .col(id_column())
                    .col(ColumnDef::new(Alias::new("kind")).string_len(16).not_null())
                    .col(ColumnDef::new(Alias::new("name")).string().not_null())
                    .col(ColumnDef::new(Alias::new("rewrite_prefix")).string().null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_content_types_kind_name")
                    .table(Alias::new("content_types"))
                    .col(Alias::new("kind"))
                    .col(Alias::new("name"))
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create settings table
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("settings"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("key"))
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Alias::new("value")).text().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for table in [
            "settings",
            "content_types",
            "entity_meta",
            "users",
            "terms",
            "posts",
        ] {
            manager
                .drop_table(Table::drop().table(Alias::new(table)).if_exists().to_owned())
                .await?;
        }
        Ok(())
    }
}
