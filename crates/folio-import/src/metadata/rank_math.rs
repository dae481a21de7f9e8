use super::non_blank;
use folio_import_types::{MetadataStrategy, SeoFields, SocialProfiles};
use serde_json::{Map, Value};

/// Networks folded into `additional_profile_urls`
const ADDITIONAL_PROFILES: [&str; 3] = ["instagram", "linkedin", "youtube"];

/// Rank Math metadata keys
#[derive(Debug, Clone, Copy, Default)]
pub struct RankMathStrategy;

impl MetadataStrategy for RankMathStrategy {
    fn name(&self) -> &str {
        "rank-math"
    }

    fn map_seo(&self, seo: &SeoFields) -> Map<String, Value> {
        non_blank([
            ("rank_math_title", seo.title.clone()),
            ("rank_math_description", seo.description.clone()),
            ("rank_math_focus_keyword", seo.keyword.clone()),
        ])
    }

    fn map_social_profiles(&self, profiles: &SocialProfiles) -> Map<String, Value> {
        let get = |network: &str| profiles.get(network).cloned().unwrap_or_default();

        let additional = ADDITIONAL_PROFILES
            .iter()
            .filter_map(|network| profiles.get(*network))
            .filter(|url| !url.trim().is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");

        non_blank([
            ("facebook", get("facebook")),
            ("twitter", get("twitter")),
            ("additional_profile_urls", additional),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_seo_drops_blank_keyword() {
        let seo = SeoFields {
            title: "About us".into(),
            description: "Who we are".into(),
            keyword: String::new(),
        };

        let meta = RankMathStrategy.map_seo(&seo);

        assert_eq!(meta.get("rank_math_title"), Some(&json!("About us")));
        assert_eq!(meta.get("rank_math_description"), Some(&json!("Who we are")));
        assert!(!meta.contains_key("rank_math_focus_keyword"));
    }

    #[test]
    fn test_social_joins_additional_profiles() {
        let mut profiles = SocialProfiles::new();
        profiles.insert("facebook".into(), "https://facebook.com/ana".into());
        profiles.insert("instagram".into(), "https://instagram.com/ana".into());
        profiles.insert("youtube".into(), "https://youtube.com/@ana".into());

        let meta = RankMathStrategy.map_social_profiles(&profiles);

        assert_eq!(meta.get("facebook"), Some(&json!("https://facebook.com/ana")));
        assert!(!meta.contains_key("twitter"));
        assert_eq!(
            meta.get("additional_profile_urls"),
            Some(&json!("https://instagram.com/ana https://youtube.com/@ana"))
        );
    }
}
