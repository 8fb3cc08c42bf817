use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Settings for talking to the meal API
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Base URL of the meal API, without a trailing slash
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// First letter of the batch loaded by `RecipeStore::initialize`
    #[serde(default = "default_letter")]
    pub default_letter: char,
    /// Request timeout in seconds. Unset means requests are only ended by
    /// completion or cancellation.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            default_letter: default_letter(),
            timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_api_base_url() -> String {
    "https://www.themealdb.com/api/json/v1/1".to_string()
}

fn default_letter() -> char {
    'b'
}

pub(crate) fn default_user_agent() -> String {
    format!("recipe-sync/{}", env!("CARGO_PKG_VERSION"))
}

impl SyncConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_SYNC__ prefix
    /// 2. recipe_sync.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_SYNC__API_BASE_URL
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration, see [`SyncConfig::load`]
pub fn load_config() -> Result<SyncConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("recipe_sync").required(false))
        .add_source(
            Environment::with_prefix("RECIPE_SYNC")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        let config = SyncConfig::default();
        assert_eq!(config.api_base_url, "https://www.themealdb.com/api/json/v1/1");
        assert_eq!(config.default_letter, 'b');
        assert!(config.timeout_secs.is_none());
        assert!(config.user_agent.starts_with("recipe-sync/"));
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: SyncConfig = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn test_toml_overrides() {
        let toml = r#"
            api_base_url = "http://localhost:8080/api"
            default_letter = "c"
            timeout_secs = 15
        "#;
        let config: SyncConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.api_base_url, "http://localhost:8080/api");
        assert_eq!(config.default_letter, 'c');
        assert_eq!(config.timeout_secs, Some(15));
    }

    #[test]
    fn test_load_config_without_file() {
        let keys: Vec<String> = std::env::vars()
            .map(|(key, _)| key)
            .filter(|key| key.starts_with("RECIPE_SYNC__"))
            .collect();
        for key in keys {
            std::env::remove_var(key);
        }

        assert_eq!(load_config().unwrap(), SyncConfig::default());
    }
}
