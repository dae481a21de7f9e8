//! Row importers
//!
//! Each importer consumes one flat row, routes metadata columns, strips the
//! reserved keys the engine injects itself, and saves one `EntityRecord`.

mod post;
mod term;
mod user;

pub use post::PostImporter;
pub use term::TermImporter;
pub use user::UserImporter;

use folio_core::ImportConfig;
use folio_import_types::{
    is_blank, value_text, ImportError, ImportLogEntry, ImportResult, MetadataStrategy, Row,
    SaveStatus, SeoFields, SocialProfiles, SEO_KEYS, SOCIAL_PROFILE_KEYS,
};
use folio_records::{EntityKind, EntityRecord};
use serde_json::{Map, Value};

/// Column prefix routing a value into metadata
const METADATA_PREFIX: &str = "m:";

/// Keys injected by the engine; never taken from input rows
const RESERVED_KEYS: [&str; 6] = ["id", "slug", "parent", "type", "login", "password"];

/// Settings importers read from the run configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSettings {
    pub default_post_type: String,
    pub category_taxonomy: String,
    pub list_delimiters: Vec<char>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self::from(&ImportConfig::default())
    }
}

impl From<&ImportConfig> for ImportSettings {
    fn from(config: &ImportConfig) -> Self {
        Self {
            default_post_type: config.default_post_type.clone(),
            category_taxonomy: config.category_taxonomy.clone(),
            list_delimiters: config.list_delimiters.chars().collect(),
        }
    }
}

impl ImportSettings {
    /// Split a list column, dropping blank and duplicate items
    pub fn split_list(&self, value: &str) -> Vec<String> {
        let mut items: Vec<String> = Vec::new();
        for item in value
            .split(|c: char| self.list_delimiters.contains(&c))
            .map(str::trim)
            .filter(|item| !item.is_empty())
        {
            if !items.iter().any(|existing| existing == item) {
                items.push(item.to_string());
            }
        }
        items
    }
}

/// Remove a column and return its trimmed text, if not blank
fn take_text(row: &mut Row, key: &str) -> Option<String> {
    let value = row.shift_remove(key)?;
    if is_blank(&value) {
        return None;
    }
    Some(value_text(&value).trim().to_string())
}

/// Remove `m:` columns, returning their non-blank values keyed without the prefix
fn take_metadata(row: &mut Row) -> Map<String, Value> {
    let keys: Vec<String> = row
        .keys()
        .filter(|key| key.starts_with(METADATA_PREFIX))
        .cloned()
        .collect();

    let mut metadata = Map::new();
    for key in keys {
        if let Some(value) = row.shift_remove(&key) {
            let name = key[METADATA_PREFIX.len()..].trim();
            if !name.is_empty() && !is_blank(&value) {
                metadata.insert(name.to_string(), value);
            }
        }
    }
    metadata
}

/// Remove the SEO columns and map them when a title is supplied
fn take_seo(
    row: &mut Row,
    strategy: Option<&dyn MetadataStrategy>,
) -> ImportResult<Map<String, Value>> {
    let [title, description, keyword] = SEO_KEYS.map(|key| take_text(row, key));

    let Some(title) = title else {
        return Ok(Map::new());
    };
    let strategy = strategy.ok_or_else(|| {
        ImportError::UnsupportedCapability("no SEO provider configured for seo_* columns".into())
    })?;

    Ok(strategy.map_seo(&SeoFields {
        title,
        description: description.unwrap_or_default(),
        keyword: keyword.unwrap_or_default(),
    }))
}

/// Remove the social profile columns and map the non-blank ones
fn take_social_profiles(
    row: &mut Row,
    strategy: Option<&dyn MetadataStrategy>,
) -> ImportResult<Map<String, Value>> {
    let profiles: SocialProfiles = SOCIAL_PROFILE_KEYS
        .iter()
        .filter_map(|network| take_text(row, network).map(|url| (network.to_string(), url)))
        .collect();

    if profiles.is_empty() {
        return Ok(Map::new());
    }
    let strategy = strategy.ok_or_else(|| {
        ImportError::UnsupportedCapability(
            "no SEO provider configured for social profile columns".into(),
        )
    })?;

    Ok(strategy.map_social_profiles(&profiles))
}

/// Drop reserved keys and blank values
fn into_fields(mut row: Row) -> Map<String, Value> {
    for key in RESERVED_KEYS {
        row.shift_remove(key);
    }
    row.into_iter()
        .filter(|(_, value)| !is_blank(value))
        .collect()
}

/// Entry for a row declined before any record was built
fn skipped(key_column: &str, key: Option<&str>) -> ImportLogEntry {
    ImportLogEntry::record(None, key_column, key, None, SaveStatus::Skipped)
}

/// Entry describing a saved record
/// Log entry keyed by the record's canonical key
async fn entry_for<K: EntityKind>(
    record: &mut EntityRecord<K>,
    status: SaveStatus,
) -> ImportLogEntry {
    let key = record.key().to_string();
    let id = record.find().await.ok().flatten().map(|entity| entity.id);
    let parent = record.find_parent().await.ok().flatten().map(|entity| entity.id);
    ImportLogEntry::record(id, K::KEY_COLUMN, Some(&key), parent, status)
}
