//! Configuration management for Earthie
//!
//! Provides TOML-based configuration with defaults and validation.
//! Location: ~/.earthie/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::{EarthieError, Result};
use crate::models::client::{DEFAULT_EMBEDDING_MODEL, DEFAULT_GEMINI_URL, DEFAULT_GENERATION_MODEL};
use crate::rag::context::MIN_RETRIEVAL_WORDS;
use crate::rag::RankConfig;

/// Complete configuration for Earthie
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub gemini: GeminiConfig,
    pub knowledge: KnowledgeConfig,
    pub retrieval: RetrievalConfig,
    pub timeouts: TimeoutsConfig,
    pub telemetry: TelemetryConfig,
}

/// Gemini connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub base_url: String,
    pub generation_model: String,
    pub embedding_model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
}

/// Knowledge cache location
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Relative paths resolve against the working directory
    pub cache_path: String,
}

/// Retrieval tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_n: usize,
    pub filename_boost: f32,
    /// Messages with fewer words skip retrieval
    pub min_query_words: usize,
}

/// Upstream call budgets
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub embedding_secs: u64,
    pub generation_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub default_verbosity: String,
    pub color_output: bool,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEMINI_URL.to_string(),
            generation_model: DEFAULT_GENERATION_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            api_key_env: "GEMINI_API_KEY".to_string(),
        }
    }
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            cache_path: "data/knowledge-cache.json".to_string(),
        }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        let rank = RankConfig::default();
        Self {
            top_n: rank.top_n,
            filename_boost: rank.filename_boost,
            min_query_words: MIN_RETRIEVAL_WORDS,
        }
    }
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            embedding_secs: 15,
            generation_secs: 60,
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            default_verbosity: "normal".to_string(),
            color_output: true,
        }
    }
}

impl Config {
    /// Load configuration from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(config_path) = path {
            Self::load_from_file(&config_path)
        } else {
            Self::load_default()
        }
    }

    /// Load configuration from specific file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EarthieError::ConfigError(format!("Failed to read config: {}", e)))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| EarthieError::ConfigError(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Load default configuration from standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(config_path) = Self::default_path() {
            if config_path.exists() {
                return Self::load_from_file(&config_path);
            }
        }

        Ok(Config::default())
    }

    /// ~/.earthie/config.toml
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".earthie").join("config.toml"))
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.gemini.base_url.trim().is_empty() {
            return Err(EarthieError::ConfigError(
                "gemini.base_url must not be empty".to_string(),
            ));
        }

        if self.gemini.generation_model.trim().is_empty()
            || self.gemini.embedding_model.trim().is_empty()
        {
            return Err(EarthieError::ConfigError(
                "gemini model names must not be empty".to_string(),
            ));
        }

        if self.retrieval.top_n == 0 {
            return Err(EarthieError::ConfigError(
                "retrieval.top_n must be greater than 0".to_string(),
            ));
        }

        if !self.retrieval.filename_boost.is_finite() || self.retrieval.filename_boost <= 0.0 {
            return Err(EarthieError::ConfigError(
                "retrieval.filename_boost must be a positive number".to_string(),
            ));
        }

        if self.timeouts.embedding_secs == 0 || self.timeouts.generation_secs == 0 {
            return Err(EarthieError::ConfigError(
                "timeouts must be greater than 0 seconds".to_string(),
            ));
        }

        match self.telemetry.default_verbosity.as_str() {
            "quiet" | "normal" | "verbose" | "very_verbose" => {}
            _ => {
                return Err(EarthieError::ConfigError(format!(
                    "Invalid verbosity level: {}",
                    self.telemetry.default_verbosity
                )))
            }
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| EarthieError::ConfigError(format!("Failed to serialize config: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| EarthieError::ConfigError(format!("Failed to create config dir: {}", e)))?;
        }

        std::fs::write(path, contents)
            .map_err(|e| EarthieError::ConfigError(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    /// Read the API key from the configured environment variable
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.gemini.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(EarthieError::ConfigError(format!(
                "Gemini API key not set; export {}",
                self.gemini.api_key_env
            ))),
        }
    }

    /// Knowledge cache path, resolved against `working_dir` when relative
    pub fn knowledge_path(&self, working_dir: &Path) -> PathBuf {
        let path = Self::expand_path(&self.knowledge.cache_path);
        if path.is_absolute() {
            path
        } else {
            working_dir.join(path)
        }
    }

    pub fn rank_config(&self) -> RankConfig {
        RankConfig {
            top_n: self.retrieval.top_n,
            filename_boost: self.retrieval.filename_boost,
        }
    }

    pub fn embedding_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.embedding_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeouts.generation_secs)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if let Some(rest) = path.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(rest);
            }
        }
        PathBuf::from(path)
    }

    /// ~/.earthie/history
    pub fn history_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".earthie").join("history"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retrieval.top_n, 5);
        assert_eq!(config.retrieval.filename_boost, 1.1);
        assert_eq!(config.retrieval.min_query_words, 5);
        assert_eq!(config.gemini.api_key_env, "GEMINI_API_KEY");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[retrieval]\ntop_n = 3\n").unwrap();
        assert_eq!(config.retrieval.top_n, 3);
        assert_eq!(config.retrieval.filename_boost, 1.1);
        assert_eq!(config.timeouts.generation_secs, 60);
    }

    #[test]
    fn test_config_validation_zero_top_n() {
        let mut config = Config::default();
        config.retrieval.top_n = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_boost() {
        let mut config = Config::default();
        config.retrieval.filename_boost = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_verbosity() {
        let mut config = Config::default();
        config.telemetry.default_verbosity = "invalid".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_knowledge_path_relative_and_absolute() {
        let mut config = Config::default();
        let cwd = Path::new("/srv/earthie");
        assert_eq!(
            config.knowledge_path(cwd),
            PathBuf::from("/srv/earthie/data/knowledge-cache.json")
        );

        config.knowledge.cache_path = "/var/cache/knowledge.json".to_string();
        assert_eq!(
            config.knowledge_path(cwd),
            PathBuf::from("/var/cache/knowledge.json")
        );
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.gemini.generation_model = "gemini-1.5-pro".to_string();
        config.save(&path).unwrap();

        let loaded = Config::load(Some(path)).unwrap();
        assert_eq!(loaded.gemini.generation_model, "gemini-1.5-pro");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path("~/.earthie");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_api_key_missing_env() {
        let mut config = Config::default();
        config.gemini.api_key_env = "EARTHIE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
        assert!(config.api_key().is_err());
    }
}
