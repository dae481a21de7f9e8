//! Database connection management

use folio_core::DatabaseConfig;
use folio_import_types::{StoreError, StoreResult};
use folio_migrations::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::sync::Arc;
use tracing::debug;

pub type DbConnection = DatabaseConnection;

/// Connect and bring the schema up to date
pub async fn establish_connection(config: &DatabaseConfig) -> StoreResult<Arc<DbConnection>> {
    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .sqlx_logging(false);

    let db = Database::connect(opt)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;

    // Run migrations
    Migrator::up(&db, None)
        .await
        .map_err(|e| StoreError::Database(e.to_string()))?;
    debug!("Database schema is up to date");

    Ok(Arc::new(db))
}
