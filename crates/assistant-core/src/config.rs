use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::paths::{config_json_path, load_config_json, load_config_toml};

const CONFIG_FILE_PATH: &str = "config.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default)]
    pub http_proxy: String,
    #[serde(default)]
    pub https_proxy: String,
    #[serde(default)]
    pub http_proxy_auth: Option<ProxyAuth>,
    #[serde(default)]
    pub https_proxy_auth: Option<ProxyAuth>,
    pub api_key: Option<String>,
    pub api_base: Option<String>,
    pub model: Option<String>,
    /// Replaces the built-in assistant persona when set.
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyAuth {
    pub username: String,
    pub password: String,
}

/// Retry budget and timing for assistant requests, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub backoff_base_ms: u64,
    pub timeout_base_ms: u64,
    pub timeout_step_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff_base_ms: 300,
            timeout_base_ms: 12_000,
            timeout_step_ms: 2_000,
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            http_proxy: String::new(),
            https_proxy: String::new(),
            http_proxy_auth: None,
            https_proxy_auth: None,
            api_key: None,
            api_base: None,
            model: None,
            system_prompt: None,
            retry: RetrySettings::default(),
        }
    }
}

impl AssistantConfig {
    /// Load from `~/.meditrack/config.json`, else `./config.toml`, then apply
    /// environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::from_files(&config_json_path(), Path::new(CONFIG_FILE_PATH));
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// First readable file wins; unreadable or invalid files are skipped.
    pub fn from_files(json_path: &Path, toml_path: &Path) -> Self {
        if json_path.exists() {
            match load_config_json::<AssistantConfig>(json_path) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", json_path.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring {}: {}", json_path.display(), e),
            }
        }

        if toml_path.exists() {
            match load_config_toml::<AssistantConfig>(toml_path) {
                Ok(config) => {
                    log::debug!("Loaded config from {}", toml_path.display());
                    return config;
                }
                Err(e) => log::warn!("Ignoring {}: {}", toml_path.display(), e),
            }
        }

        Self::default()
    }

    /// Apply environment overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(api_key) = lookup("GEMINI_API_KEY") {
            self.api_key = Some(api_key);
        }
        if let Some(api_base) = lookup("GEMINI_API_BASE") {
            self.api_base = Some(api_base);
        }
        if let Some(model) = lookup("GEMINI_MODEL") {
            self.model = Some(model);
        }
        if let Some(retries) = lookup("ASSISTANT_MAX_RETRIES") {
            self.retry.max_retries =
                retries
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: "ASSISTANT_MAX_RETRIES".to_string(),
                        value: retries.clone(),
                    })?;
        }
        Ok(())
    }

    pub fn api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_retry_budget() {
        let config = AssistantConfig::default();
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.backoff_base_ms, 300);
        assert_eq!(config.retry.timeout_base_ms, 12_000);
        assert_eq!(config.retry.timeout_step_ms, 2_000);
        assert!(config.api_key().is_err());
    }

    #[test]
    fn json_file_takes_precedence_over_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        let toml_path = dir.path().join("config.toml");
        std::fs::write(&json_path, r#"{"api_key": "from-json", "model": "gemini-json"}"#).unwrap();
        std::fs::write(&toml_path, "api_key = \"from-toml\"\n").unwrap();

        let config = AssistantConfig::from_files(&json_path, &toml_path);
        assert_eq!(config.api_key.as_deref(), Some("from-json"));
        assert_eq!(config.model.as_deref(), Some("gemini-json"));
        assert_eq!(config.retry, RetrySettings::default());
    }

    #[test]
    fn invalid_json_falls_back_to_toml() {
        let dir = tempfile::tempdir().unwrap();
        let json_path = dir.path().join("config.json");
        let toml_path = dir.path().join("config.toml");
        std::fs::write(&json_path, "{not json").unwrap();
        std::fs::write(
            &toml_path,
            "api_key = \"from-toml\"\n\n[retry]\nmax_retries = 4\n",
        )
        .unwrap();

        let config = AssistantConfig::from_files(&json_path, &toml_path);
        assert_eq!(config.api_key.as_deref(), Some("from-toml"));
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.retry.backoff_base_ms, 300);
    }

    #[test]
    fn missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config =
            AssistantConfig::from_files(&dir.path().join("a.json"), &dir.path().join("b.toml"));
        assert!(config.api_key.is_none());
        assert!(config.http_proxy.is_empty());
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = AssistantConfig {
            api_key: Some("file".into()),
            ..Default::default()
        };
        config
            .apply_env(env(&[
                ("GEMINI_API_KEY", "env-key"),
                ("GEMINI_MODEL", "gemini-2.5-pro"),
                ("HTTPS_PROXY", "http://proxy:8080"),
                ("ASSISTANT_MAX_RETRIES", " 5 "),
            ]))
            .unwrap();

        assert_eq!(config.api_key().unwrap(), "env-key");
        assert_eq!(config.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(config.https_proxy, "http://proxy:8080");
        assert_eq!(config.retry.max_retries, 5);
    }

    #[test]
    fn invalid_retry_override_is_rejected() {
        let mut config = AssistantConfig::default();
        let err = config
            .apply_env(env(&[("ASSISTANT_MAX_RETRIES", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = AssistantConfig {
            api_key: Some("   ".into()),
            ..Default::default()
        };
        assert!(matches!(config.api_key(), Err(ConfigError::MissingApiKey)));
    }
}
