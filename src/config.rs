use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::models::domain::{
    FilterThresholds, DEFAULT_CASTE_PENALTY, DEFAULT_INCOME_WINDOW, DEFAULT_MIN_TEXT_LEN,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub scorer: ScorerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub filter: FilterSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
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
fn default_port() -> u16 { 5000 }

/// Which scorer backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScorerBackend {
    Process,
    Http,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScorerSettings {
    #[serde(default = "default_backend")]
    pub backend: ScorerBackend,
    #[serde(default = "default_python_path")]
    pub python_path: String,
    #[serde(default = "default_script_path")]
    pub script_path: String,
    #[serde(default = "default_model_path")]
    pub model_path: String,
    pub working_dir: Option<String>,
    pub url: Option<String>,
    pub api_key: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ScorerSettings {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            python_path: default_python_path(),
            script_path: default_script_path(),
            model_path: default_model_path(),
            working_dir: None,
            url: None,
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_backend() -> ScorerBackend { ScorerBackend::Process }
fn default_python_path() -> String { "python".to_string() }
fn default_script_path() -> String { "inference.py".to_string() }
fn default_model_path() -> String { "artifacts/scheme_recommender.joblib".to_string() }
fn default_timeout_secs() -> u64 { 60 }

#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
    #[serde(default = "default_cache_entries")]
    pub max_entries: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

fn default_cache_enabled() -> bool { true }
fn default_cache_ttl() -> u64 { 300 }
fn default_cache_entries() -> u64 { 1000 }

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSettings {
    #[serde(default = "default_min_text_len")]
    pub min_text_len: usize,
    #[serde(default = "default_caste_penalty")]
    pub caste_penalty: f64,
    #[serde(default = "default_income_window")]
    pub income_window: usize,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            min_text_len: default_min_text_len(),
            caste_penalty: default_caste_penalty(),
            income_window: default_income_window(),
        }
    }
}

impl From<&FilterSettings> for FilterThresholds {
    fn from(settings: &FilterSettings) -> Self {
        Self {
            min_text_len: settings.min_text_len,
            caste_penalty: settings.caste_penalty,
            income_window: settings.income_window,
        }
    }
}

fn default_min_text_len() -> usize { DEFAULT_MIN_TEXT_LEN }
fn default_caste_penalty() -> f64 { DEFAULT_CASTE_PENALTY }
fn default_income_window() -> usize { DEFAULT_INCOME_WINDOW }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "compact".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCHEME__)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCHEME__SERVER__PORT -> server.port
            .add_source(env_source())
            .build()?;

        apply_legacy_env(settings)?.try_deserialize()
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(env_source())
            .build()?;

        settings.try_deserialize()
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SCHEME")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Honour the unprefixed `PORT` and `PYTHON_PATH` variables
fn apply_legacy_env(settings: Config) -> Result<Config, ConfigError> {
    use std::env;

    let mut builder = Config::builder().add_source(settings);

    if let Ok(python) = env::var("PYTHON_PATH") {
        builder = builder.set_override("scorer.python_path", python)?;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        builder = builder.set_override("server.port", port)?;
    }

    builder.build()
}
