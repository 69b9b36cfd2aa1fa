//! Doctor command for system diagnostics
//!
//! Checks configuration, credentials, the knowledge cache and Gemini
//! reachability without sending a chat request.

use colored::*;
use std::path::PathBuf;

use crate::cli::Config;
use crate::knowledge::{CacheStatus, KnowledgeCache};
use crate::models::GeminiClient;

/// Health check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Pass,
    Warn(String),
    Fail(String),
}

/// Individual health check
#[derive(Debug)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
}

impl HealthCheck {
    fn new(name: &str, status: HealthStatus) -> Self {
        Self {
            name: name.to_string(),
            status,
        }
    }
}

/// Doctor diagnostics system
pub struct Doctor {
    config: Config,
    cache_path: PathBuf,
}

impl Doctor {
    pub fn new(config: Config, cache_path: PathBuf) -> Self {
        Self { config, cache_path }
    }

    /// Run all health checks
    pub async fn run_diagnostics(&self) -> Vec<HealthCheck> {
        let cache = KnowledgeCache::load(&self.cache_path);

        let mut checks = vec![
            self.check_config(),
            self.check_api_key(),
            self.check_knowledge_cache(&cache),
            self.check_embedding_dimension(&cache),
        ];
        checks.push(self.check_gemini_api().await);
        checks
    }

    /// Check 1: configuration values
    fn check_config(&self) -> HealthCheck {
        match self.config.validate() {
            Ok(()) => HealthCheck::new("Configuration", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Configuration", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Check 2: API key present
    fn check_api_key(&self) -> HealthCheck {
        match self.config.api_key() {
            Ok(_) => HealthCheck::new("Gemini API Key", HealthStatus::Pass),
            Err(e) => HealthCheck::new("Gemini API Key", HealthStatus::Fail(e.to_string())),
        }
    }

    /// Check 3: knowledge cache loaded
    fn check_knowledge_cache(&self, cache: &KnowledgeCache) -> HealthCheck {
        let name = "Knowledge Cache";
        let path = self.cache_path.display();
        let status = match cache.status() {
            CacheStatus::Loaded => HealthStatus::Pass,
            CacheStatus::Missing => {
                HealthStatus::Warn(format!("{} not found; chat runs without retrieval", path))
            }
            CacheStatus::Empty => {
                HealthStatus::Warn(format!("{} has no usable chunks", path))
            }
            CacheStatus::Corrupt(reason) => {
                HealthStatus::Warn(format!("{} could not be parsed: {}", path, reason))
            }
        };
        HealthCheck::new(name, status)
    }

    /// Check 4: every chunk shares one embedding dimension
    fn check_embedding_dimension(&self, cache: &KnowledgeCache) -> HealthCheck {
        let stats = cache.stats();
        let name = "Embedding Dimension";
        match stats.dimension {
            None => HealthCheck::new(name, HealthStatus::Warn("No embeddings loaded".to_string())),
            Some(_) if stats.discarded > 0 => HealthCheck::new(
                name,
                HealthStatus::Warn(format!("{} chunks discarded at load", stats.discarded)),
            ),
            Some(_) => HealthCheck::new(name, HealthStatus::Pass),
        }
    }

    /// Check 5: Gemini reachable with the configured key
    async fn check_gemini_api(&self) -> HealthCheck {
        let name = "Gemini API";
        let key = match self.config.api_key() {
            Ok(key) => key,
            Err(_) => return HealthCheck::new(name, HealthStatus::Warn("Skipped: no API key".to_string())),
        };

        let client = match GeminiClient::with_config(
            &self.config.gemini.base_url,
            &key,
            &self.config.gemini.generation_model,
            &self.config.gemini.embedding_model,
        ) {
            Ok(client) => client,
            Err(e) => return HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        };

        match client.health_check().await {
            Ok(true) => HealthCheck::new(name, HealthStatus::Pass),
            Ok(false) => HealthCheck::new(
                name,
                HealthStatus::Fail(format!(
                    "Model {} not reachable at {}",
                    client.generation_model(),
                    client.base_url()
                )),
            ),
            Err(e) => HealthCheck::new(name, HealthStatus::Fail(e.to_string())),
        }
    }

    /// Print results; returns true when nothing failed
    pub fn print_report(checks: &[HealthCheck]) -> bool {
        println!("\n{}", "Earthie Doctor".bold().cyan());
        println!("{}", "=".repeat(40).cyan());

        let mut healthy = true;
        for check in checks {
            match &check.status {
                HealthStatus::Pass => println!("{} {}", "✓".green(), check.name),
                HealthStatus::Warn(msg) => {
                    println!("{} {}: {}", "!".yellow(), check.name, msg.yellow())
                }
                HealthStatus::Fail(msg) => {
                    healthy = false;
                    println!("{} {}: {}", "✗".red(), check.name, msg.red())
                }
            }
        }

        println!();
        healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KnowledgeChunk;

    fn doctor() -> Doctor {
        Doctor::new(Config::default(), PathBuf::from("/nonexistent/knowledge.json"))
    }

    #[test]
    fn test_missing_cache_warns() {
        let doctor = doctor();
        let cache = KnowledgeCache::load(&doctor.cache_path);
        let check = doctor.check_knowledge_cache(&cache);
        assert!(matches!(check.status, HealthStatus::Warn(_)));
    }

    #[test]
    fn test_loaded_cache_passes() {
        let cache = KnowledgeCache::from_chunks(vec![KnowledgeChunk {
            file_name: "a.md".to_string(),
            chunk_index: 0,
            content: "alpha".to_string(),
            embedding: vec![1.0, 0.0],
        }]);
        let doctor = doctor();
        assert_eq!(doctor.check_knowledge_cache(&cache).status, HealthStatus::Pass);
        assert_eq!(doctor.check_embedding_dimension(&cache).status, HealthStatus::Pass);
    }

    #[test]
    fn test_invalid_config_fails() {
        let mut config = Config::default();
        config.retrieval.top_n = 0;
        let doctor = Doctor::new(config, PathBuf::from("kb.json"));
        assert!(matches!(doctor.check_config().status, HealthStatus::Fail(_)));
    }
}
