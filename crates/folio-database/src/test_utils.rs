//! Test utilities for database-backed tests

use crate::{establish_connection, DbConnection, SeaOrmRepository};
use folio_core::DatabaseConfig;
use folio_import_types::StoreResult;
use std::sync::Arc;

/// Migrated in-memory SQLite database
///
/// Limited to one pooled connection: every SQLite memory connection is a
/// separate database.
pub async fn memory_connection() -> StoreResult<Arc<DbConnection>> {
    establish_connection(&DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    })
    .await
}

/// Repository over a fresh in-memory database
pub async fn memory_repository() -> StoreResult<SeaOrmRepository> {
    Ok(SeaOrmRepository::new(memory_connection().await?))
}
