//! Core types and traits for the Folio import system
//!
//! This crate provides the foundational abstractions shared by the
//! reconciliation engine (`folio-records`), the import pipeline
//! (`folio-import`) and the persistence layer (`folio-database`).
//!
//! # Architecture
//!
//! - **Traits**: `EntityRepository` (persistence store), `Importer` (row to
//!   entity), `SourceAdapter` (file to rows), `FileDiscovery`, `FileSelector`
//!   and `MetadataStrategy`
//! - **Types**: `PathKey`, `FieldSet`, `Entity`, `SaveStatus`, `ImportLog`
//! - **Errors**: `ImportError` for pipeline failures, `StoreError` for
//!   repository failures

pub mod discovery;
pub mod error;
pub mod fields;
pub mod importer;
pub mod log;
pub mod metadata;
pub mod path;
pub mod repository;
pub mod status;

pub use discovery::{DiscoveredFile, FileDiscovery, FileSelector};
pub use error::{ImportError, ImportResult, StoreError, StoreResult};
pub use fields::{is_blank, value_text, FieldSet, Row};
pub use importer::{ImportSource, ImportType, Importer, SourceAdapter};
pub use log::{
    DetailTable, FileFailure, FileLog, FileSummary, ImportLog, ImportLogEntry, StatusCounts,
    NOT_AVAILABLE, SUMMARY_HEADERS,
};
pub use metadata::{MetadataStrategy, SeoFields, SocialProfiles, SEO_KEYS, SOCIAL_PROFILE_KEYS};
pub use path::PathKey;
pub use repository::{Entity, EntityRepository, EntityScope, StoredMetadata};
pub use status::SaveStatus;
