//! Folio import pipeline
//!
//! Turns input files into reconciled entities.
//!
//! # Architecture
//!
//! - **Importers**: one row to one `EntityRecord` save (posts, terms, users)
//! - **Adapters**: one family of files to rows (spreadsheets, content files)
//! - **Metadata**: SEO and social profile mapping strategies
//! - **Discovery**: directory walking with extension and name filters
//! - **Services**: the orchestrator wiring all of the above for one run

pub mod adapters;
pub mod discovery;
pub mod importers;
pub mod metadata;
pub mod services;

pub use adapters::{ContentAdapter, SpreadsheetAdapter};
pub use discovery::WalkDirDiscovery;
pub use importers::{ImportSettings, PostImporter, TermImporter, UserImporter};
pub use metadata::{strategy_for, RankMathStrategy, YoastStrategy};
pub use services::{AdapterFactory, ImportOrchestrator, ImportReport, ImportRequest};
