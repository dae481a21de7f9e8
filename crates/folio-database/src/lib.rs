//! Database connection and the SQL-backed `EntityRepository`

pub use sea_orm;

mod connection;
mod repository;
mod site;

pub use connection::{establish_connection, DbConnection};
pub use folio_entities::content_types::ContentTypeKind;
pub use repository::SeaOrmRepository;
pub use site::{apply_site_config, FRONT_PAGE_POST_TYPE};

// Export test utilities for use by other crates in their tests
pub mod test_utils;
