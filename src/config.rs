use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use safemenu_allergy::{ClassifyOptions, FragranceRule, MissingDataPolicy};
use safemenu_shared::Catalog;
use serde::Deserialize;
use std::env;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub classification: ClassificationConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// `pretty` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClassificationConfig {
    /// What a targeted allergen without recorded data means.
    /// Changing this is a product-safety decision.
    #[serde(default)]
    pub missing_data: MissingDataPolicy,
    #[serde(default = "default_fragrance_keywords")]
    pub fragrance_keywords: Vec<String>,
    /// Allergens shown in contamination/fragrance labels, whole catalog when unset
    #[serde(default)]
    pub label_slugs: Option<Vec<String>>,
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            missing_data: MissingDataPolicy::default(),
            fragrance_keywords: default_fragrance_keywords(),
            label_slugs: None,
        }
    }
}

fn default_fragrance_keywords() -> Vec<String> {
    FragranceRule::default().keywords().to_vec()
}

impl ClassificationConfig {
    pub fn options(&self) -> ClassifyOptions {
        ClassifyOptions {
            missing_data: self.missing_data,
            fragrance_keywords: FragranceRule::new(&self.fragrance_keywords),
            label_slugs: self.label_slugs.clone(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (SAFEMENU__CLASSIFICATION__MISSING_DATA, etc.)
    /// 2. Config file specified by path, CONFIG_PATH, or config/default.toml
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        Self::load_from(&config_file_path, true)
    }

    /// Load from an explicit file, optionally layering environment variables on top.
    pub fn load_from(path: &str, with_env: bool) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder()
            .set_default("observability.log_level", default_log_level())?
            .set_default("observability.format", default_log_format())?;

        // Missing file is fine, defaults apply
        if Path::new(path).exists() {
            builder = builder.add_source(File::with_name(path));
        }

        if with_env {
            builder = builder.add_source(
                Environment::with_prefix("SAFEMENU")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("classification.fragrance_keywords")
                    .with_list_parse_key("classification.label_slugs")
                    .try_parsing(true),
            );

            // Plain RUST_LOG-style override without the prefix
            if let Ok(level) = env::var("LOG_LEVEL") {
                builder = builder.set_override("observability.log_level", level)?;
            }
        }

        builder.build()?.try_deserialize()
    }

    /// Reject values the engine would otherwise silently ignore
    pub fn validate(&self) -> Result<(), String> {
        match self.observability.format.as_str() {
            "pretty" | "json" => {}
            other => {
                return Err(format!(
                    "observability.format must be `pretty` or `json`, got `{other}`"
                ));
            }
        }

        let catalog = Catalog::standard();
        for slug in self.classification.label_slugs.iter().flatten() {
            catalog
                .parse_slug(slug)
                .map_err(|e| format!("classification.label_slugs: {e}"))?;
        }

        if self
            .classification
            .fragrance_keywords
            .iter()
            .all(|k| k.trim().is_empty())
        {
            tracing::warn!("no fragrance keywords configured, legacy notes will never reclassify");
        }

        Ok(())
    }
}
