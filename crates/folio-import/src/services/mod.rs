//! Import orchestration services

mod orchestrator;

pub use orchestrator::{AdapterFactory, ImportOrchestrator, ImportReport, ImportRequest};
