//! SEO and social profile metadata strategies

mod rank_math;
mod yoast;

pub use rank_math::RankMathStrategy;
pub use yoast::YoastStrategy;

use folio_core::SeoProvider;
use folio_import_types::MetadataStrategy;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Strategy for the configured provider
pub fn strategy_for(provider: Option<SeoProvider>) -> Option<Arc<dyn MetadataStrategy>> {
    match provider? {
        SeoProvider::RankMath => Some(Arc::new(RankMathStrategy)),
        SeoProvider::Yoast => Some(Arc::new(YoastStrategy)),
    }
}

/// Build a metadata map, dropping blank values
fn non_blank<'a>(entries: impl IntoIterator<Item = (&'a str, String)>) -> Map<String, Value> {
    entries
        .into_iter()
        .filter(|(_, value)| !value.trim().is_empty())
        .map(|(key, value)| (key.to_string(), Value::String(value)))
        .collect()
}
