//! sea-orm models of the Folio content store

pub mod content_types;
pub mod entity_meta;
pub mod posts;
pub mod settings;
pub mod terms;
pub mod users;

mod timestamps;

/// Timestamp type used by every table
pub type DBDateTime = chrono::DateTime<chrono::Utc>;
