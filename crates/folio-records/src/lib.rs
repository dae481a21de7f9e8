//! Entity resolution and reconciliation
//!
//! `EntityRecord<K>` is the single save engine for posts, terms and users.
//! Every record of a run shares one `ResolutionContext`: the repository
//! handle, the entity cache and the rewrite prefix resolver.

pub mod cache;
pub mod context;
pub mod kind;
#[cfg(any(test, feature = "testing"))]
pub mod memory;
pub mod prefix;
pub mod record;

pub use cache::ResolutionCache;
pub use context::ResolutionContext;
pub use kind::{generate_password, EntityKind, PostKind, TermKind, UserKind};
#[cfg(any(test, feature = "testing"))]
pub use memory::MemoryRepository;
pub use prefix::PrefixResolver;
pub use record::{EntityRecord, PostRecord, TermRecord, UserRecord};
