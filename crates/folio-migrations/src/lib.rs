//! Database migrations for the Folio content store

pub use sea_orm_migration::prelude::*;

mod migration;

pub use migration::Migrator;
