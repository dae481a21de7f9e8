//! Run Configuration (folio.yaml)
//!
//! Defines the configuration file read by the CLI before an import run:
//! database connection, default source directories and the content-model
//! settings the import engine needs (rewrite prefixes, front page, SEO
//! provider).

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "folio.yaml";

/// Complete configuration structure for folio.yaml
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct FolioConfig {
    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Import pipeline settings
    #[serde(default)]
    pub import: ImportConfig,
}

/// Database connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseConfig {
    /// Connection URL (`sqlite://...` or `postgres://...`)
    #[serde(default = "default_database_url")]
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
        }
    }
}

/// Provider used to map SEO and social profile columns onto metadata keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SeoProvider {
    RankMath,
    Yoast,
}

/// Rewrite prefixes registered per post type and per taxonomy
///
/// Example: a `docs` post type served under `/documentation/...` has the
/// prefix `documentation`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RewritePrefixes {
    #[serde(default)]
    pub post_types: BTreeMap<String, String>,

    #[serde(default)]
    pub taxonomies: BTreeMap<String, String>,
}

/// Import pipeline settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportConfig {
    /// Default input directory per source name (`spreadsheet`, `content`)
    #[serde(default)]
    pub sources: BTreeMap<String, PathBuf>,

    /// Post type used when a row has no `type` column
    #[serde(default = "default_post_type")]
    pub default_post_type: String,

    /// Taxonomy the `categories` column of posts resolves against
    #[serde(default = "default_category_taxonomy")]
    pub category_taxonomy: String,

    /// Characters separating items of list columns (`categories`, `tags`)
    #[serde(default = "default_list_delimiters")]
    pub list_delimiters: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seo_provider: Option<SeoProvider>,

    #[serde(default)]
    pub rewrite_prefixes: RewritePrefixes,

    /// Path of the page served at the site root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_page: Option<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            sources: BTreeMap::new(),
            default_post_type: default_post_type(),
            category_taxonomy: default_category_taxonomy(),
            list_delimiters: default_list_delimiters(),
            seo_provider: None,
            rewrite_prefixes: RewritePrefixes::default(),
            front_page: None,
        }
    }
}

fn default_database_url() -> String {
    "sqlite://folio.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_min_connections() -> u32 {
    1
}

fn default_post_type() -> String {
    "page".to_string()
}

fn default_category_taxonomy() -> String {
    "category".to_string()
}

fn default_list_delimiters() -> String {
    ",|".to_string()
}

impl FolioConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> ConfigResult<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to YAML string
    pub fn to_yaml(&self) -> ConfigResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Load configuration from a file on disk
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_yaml(&contents)
    }

    /// Load an explicit configuration file, or `folio.yaml` from the working
    /// directory when present, or fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> ConfigResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::load(default_path)
                } else {
                    debug!("No {} found, using default configuration", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Configured default directory for a source
    pub fn source_path(&self, source: &str) -> Option<&Path> {
        self.import.sources.get(source).map(PathBuf::as_path)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.import.list_delimiters.is_empty() {
            return Err(ConfigError::Invalid {
                message: "listDelimiters must contain at least one character".to_string(),
            });
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid {
                message: format!(
                    "minConnections ({}) exceeds maxConnections ({})",
                    self.database.min_connections, self.database.max_connections
                ),
            });
        }
        Ok(())
    }
}
