//! Core utilities and configuration shared across all Folio crates

pub mod config;
pub mod error;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use error::*;
pub use utils::*;
