//! Pluggable SEO and social profile metadata mapping

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Row columns consumed by `MetadataStrategy::map_seo`
pub const SEO_KEYS: [&str; 3] = ["seo_title", "seo_description", "seo_keyword"];

/// Row columns consumed by `MetadataStrategy::map_social_profiles`
pub const SOCIAL_PROFILE_KEYS: [&str; 5] =
    ["facebook", "twitter", "instagram", "linkedin", "youtube"];

/// Network name to profile URL
pub type SocialProfiles = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeoFields {
    pub title: String,
    pub description: String,
    pub keyword: String,
}

/// Maps SEO fields and social profiles onto provider specific metadata keys
pub trait MetadataStrategy: Send + Sync {
    /// Provider identifier
    fn name(&self) -> &str;

    fn map_seo(&self, seo: &SeoFields) -> Map<String, Value>;

    fn map_social_profiles(&self, profiles: &SocialProfiles) -> Map<String, Value>;
}
