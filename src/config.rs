use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::core::RankerConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    pub scorer: ScorerSettings,
    #[serde(default)]
    pub ranking: RankingSettings,
    #[serde(default)]
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }

/// OpenAI-compatible chat-completions endpoint used for relevance scoring
#[derive(Debug, Clone, Deserialize)]
pub struct ScorerSettings {
    pub endpoint: String,
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
}

fn default_model() -> String { "gpt-4o-mini".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct RankingSettings {
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    #[serde(default = "default_call_timeout_secs")]
    pub call_timeout_secs: u64,
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: Option<u64>,
}

impl Default for RankingSettings {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            call_timeout_secs: default_call_timeout_secs(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_max_concurrency() -> usize { 4 }
fn default_call_timeout_secs() -> u64 { 20 }
fn default_deadline_secs() -> Option<u64> { Some(60) }

/// Upper bound for a single scoring call
const MAX_CALL_TIMEOUT_SECS: u64 = 300;
/// Upper bound for a whole ranking pass
const MAX_DEADLINE_SECS: u64 = 3600;

impl RankingSettings {
    /// Ranker tuning with every budget clamped to `1..=max` seconds
    pub fn ranker_config(&self) -> RankerConfig {
        RankerConfig {
            max_concurrency: self.max_concurrency.max(1),
            call_timeout: Duration::from_secs(clamp_secs(
                "call_timeout_secs",
                self.call_timeout_secs,
                MAX_CALL_TIMEOUT_SECS,
            )),
            deadline: self
                .deadline_secs
                .map(|secs| Duration::from_secs(clamp_secs("deadline_secs", secs, MAX_DEADLINE_SECS))),
        }
    }
}

fn clamp_secs(key: &str, secs: u64, max: u64) -> u64 {
    let clamped = secs.clamp(1, max);
    if clamped != secs {
        tracing::warn!("ranking.{} = {} is out of range, using {}", key, secs, clamped);
    }
    clamped
}

/// Fixture locations; bundled data is used when a path is absent
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSettings {
    pub accommodations_path: Option<String>,
    pub gazetteer_path: Option<String>,
}

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with STAYFINDER_)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., STAYFINDER__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("STAYFINDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings = apply_api_key_fallback(settings)?;

        settings.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("STAYFINDER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}

/// Take the scorer API key from OPENAI_API_KEY when none was configured
fn apply_api_key_fallback(settings: Config) -> Result<Config, ConfigError> {
    if settings.get_string("scorer.api_key").is_ok() {
        return Ok(settings);
    }

    match std::env::var("OPENAI_API_KEY") {
        Ok(key) => Config::builder()
            .add_source(settings)
            .set_override("scorer.api_key", key)?
            .build(),
        Err(_) => Ok(settings),
    }
}
