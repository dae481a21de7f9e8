use super::non_blank;
use folio_import_types::{MetadataStrategy, SeoFields, SocialProfiles};
use serde_json::{Map, Value};
use url::Url;

/// Yoast SEO metadata keys
#[derive(Debug, Clone, Copy, Default)]
pub struct YoastStrategy;

impl YoastStrategy {
    /// Twitter handle from a profile URL or a bare handle
    fn twitter_handle(value: &str) -> String {
        let path = match Url::parse(value) {
            Ok(url) => url.path().to_string(),
            Err(_) => value.to_string(),
        };
        path.replace('@', "").trim_matches('/').to_string()
    }
}

impl MetadataStrategy for YoastStrategy {
    fn name(&self) -> &str {
        "yoast"
    }

    fn map_seo(&self, seo: &SeoFields) -> Map<String, Value> {
        non_blank([
            ("_yoast_wpseo_title", seo.title.clone()),
            ("_yoast_wpseo_metadesc", seo.description.clone()),
            ("_yoast_wpseo_focuskw", seo.keyword.clone()),
        ])
    }

    fn map_social_profiles(&self, profiles: &SocialProfiles) -> Map<String, Value> {
        let entries: Vec<(&str, String)> = profiles
            .iter()
            .filter_map(|(network, url)| {
                let entry = match network.as_str() {
                    "facebook" => ("wpseo_facebook", url.clone()),
                    "twitter" => ("wpseo_twitter", Self::twitter_handle(url)),
                    "instagram" => ("wpseo_instagram_url", url.clone()),
                    "linkedin" => ("wpseo_linkedin", url.clone()),
                    "youtube" => ("wpseo_youtube_url", url.clone()),
                    _ => return None,
                };
                Some(entry)
            })
            .collect();

        non_blank(entries)
    }
}
