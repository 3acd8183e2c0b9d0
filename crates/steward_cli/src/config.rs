//! Configuration file support for steward.
//!
//! Configuration is loaded using the `config` crate with layered sources:
//! 1. Built-in defaults
//! 2. XDG config file (~/.config/steward/config.toml)
//! 3. Local config file (./steward.toml)
//! 4. Environment variables (STEWARD_* prefix)
//! 5. Legacy environment variables (VSTS_TOKEN, VSTS_ENDPOINT)
//!
//! Example config file:
//!
//! ```toml
//! [vsts]
//! endpoint = "https://dev.azure.com/acme"
//! token = "..."  # or use STEWARD_VSTS__TOKEN env var
//! repository = "Tools/Website"
//!
//! [client]
//! requests_per_second = 10
//! timeout_secs = 30
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::Deserialize;
use steward::rate_limits;

/// Main configuration structure.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub vsts: VstsConfig,
    pub client: ClientConfig,
}

/// Azure DevOps connection settings.
#[derive(Debug, Default, Deserialize, Clone)]
#[serde(default)]
pub struct VstsConfig {
    /// Collection endpoint, e.g. `https://dev.azure.com/acme`.
    pub endpoint: Option<String>,
    /// Personal access token.
    ///
    /// Can also be set via STEWARD_VSTS__TOKEN or VSTS_TOKEN.
    pub token: Option<String>,
    /// Default repository, as `project/name` or a bare name.
    pub repository: Option<String>,
}

/// HTTP client settings.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClientConfig {
    /// Request pacing; zero disables the rate limiter.
    pub requests_per_second: u32,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            requests_per_second: rate_limits::AZURE_DEVOPS_DEFAULT_RPS,
            timeout_secs: 30,
        }
    }
}

impl Config {
    /// Load configuration using the config crate's layered approach.
    ///
    /// Sources are loaded in order (later sources override earlier).
    pub fn load() -> Self {
        let mut builder = ConfigBuilder::builder();

        if let Some(xdg_config) = Self::default_config_path()
            && xdg_config.exists()
        {
            tracing::debug!("Loading config from {:?}", xdg_config);
            builder = builder.add_source(
                File::from(xdg_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        let local_config = PathBuf::from("steward.toml");
        if local_config.exists() {
            tracing::debug!("Loading config from ./steward.toml");
            builder = builder.add_source(
                File::from(local_config)
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(Self::env_source());

        let mut config = match builder.build() {
            Ok(settings) => match settings.try_deserialize::<Config>() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!("Failed to deserialize config: {}", e);
                    Config::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to build config: {}", e);
                Config::default()
            }
        };

        config.apply_legacy_env(|key| env::var(key).ok());
        config
    }

    /// `STEWARD_` variables, with `__` between nested keys.
    ///
    /// e.g., STEWARD_VSTS__TOKEN -> vsts.token
    fn env_source() -> Environment {
        Environment::with_prefix("STEWARD")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true)
    }

    /// Fill unset connection settings from the legacy `VSTS_*` variables.
    fn apply_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if self.vsts.token.is_none() {
            self.vsts.token = non_empty("VSTS_TOKEN");
        }
        if self.vsts.endpoint.is_none() {
            self.vsts.endpoint = non_empty("VSTS_ENDPOINT");
        }
    }

    /// Request timeout for the HTTP client.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.client.timeout_secs)
    }

    /// Get the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "steward").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml_content: &str) -> Config {
        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(toml_content, FileFormat::Toml))
            .build()
            .unwrap();
        settings.try_deserialize().unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.vsts.endpoint.is_none());
        assert!(config.vsts.token.is_none());
        assert!(config.vsts.repository.is_none());
        assert_eq!(config.client.requests_per_second, 10);
        assert_eq!(config.client.timeout_secs, 30);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_config_builder_with_toml_string() {
        let config = from_toml(
            r#"
            [vsts]
            endpoint = "https://dev.azure.com/acme"
            token = "pat-123"
            repository = "Tools/Website"

            [client]
            requests_per_second = 5
            timeout_secs = 60
        "#,
        );

        assert_eq!(
            config.vsts.endpoint.as_deref(),
            Some("https://dev.azure.com/acme")
        );
        assert_eq!(config.vsts.token.as_deref(), Some("pat-123"));
        assert_eq!(config.vsts.repository.as_deref(), Some("Tools/Website"));
        assert_eq!(config.client.requests_per_second, 5);
        assert_eq!(config.client.timeout_secs, 60);
    }

    #[test]
    fn test_config_builder_partial_override() {
        let config = from_toml(
            r#"
            [client]
            timeout_secs = 5
        "#,
        );

        assert_eq!(config.client.timeout_secs, 5);
        assert_eq!(config.client.requests_per_second, 10);
        assert!(config.vsts.endpoint.is_none());
    }

    #[test]
    fn test_config_builder_with_defaults() {
        let settings = ConfigBuilder::builder().build().unwrap();
        let config: Config = settings.try_deserialize().unwrap_or_default();
        assert_eq!(config.client.requests_per_second, 10);
    }

    #[test]
    fn test_env_source_maps_double_underscore_names() {
        let mut vars = config::Map::new();
        vars.insert("STEWARD_VSTS__TOKEN".to_string(), "env-token".to_string());
        vars.insert(
            "STEWARD_CLIENT__REQUESTS_PER_SECOND".to_string(),
            "3".to_string(),
        );

        let settings = ConfigBuilder::builder()
            .add_source(config::File::from_str(
                "[vsts]\ntoken = \"file-token\"\n",
                FileFormat::Toml,
            ))
            .add_source(Config::env_source().source(Some(vars)))
            .build()
            .unwrap();
        let config: Config = settings.try_deserialize().unwrap();

        assert_eq!(config.vsts.token.as_deref(), Some("env-token"));
        assert_eq!(config.client.requests_per_second, 3);
        assert_eq!(config.client.timeout_secs, 30);
    }

    #[test]
    fn test_legacy_env_fills_missing_values() {
        let mut config = Config::default();
        config.apply_legacy_env(|key| match key {
            "VSTS_TOKEN" => Some("legacy-token".to_string()),
            "VSTS_ENDPOINT" => Some("https://old.visualstudio.com".to_string()),
            _ => None,
        });

        assert_eq!(config.vsts.token.as_deref(), Some("legacy-token"));
        assert_eq!(
            config.vsts.endpoint.as_deref(),
            Some("https://old.visualstudio.com")
        );
    }

    #[test]
    fn test_legacy_env_does_not_override_configured_values() {
        let mut config = from_toml(
            r#"
            [vsts]
            token = "configured"
        "#,
        );
        config.apply_legacy_env(|key| match key {
            "VSTS_TOKEN" => Some("legacy-token".to_string()),
            "VSTS_ENDPOINT" => Some(String::new()),
            _ => None,
        });

        assert_eq!(config.vsts.token.as_deref(), Some("configured"));
        assert!(config.vsts.endpoint.is_none());
    }
}
