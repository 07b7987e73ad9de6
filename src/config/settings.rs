//! TOML-based configuration for keyscout.
//!
//! Supports a config file (keyscout.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [source]
//! driver = "sqlite"
//! path = "${DATA_DIR}/shop.db"
//!
//! [discovery]
//! integrity_threshold = 0.1
//! auto_increment_ratio = 0.95
//! min_strength = "normal"
//! name_normalization = "suffix"
//! fallback_enabled = true
//!
//! [llm]
//! enabled = true
//! api_key = "${OPENAI_API_KEY}"
//! model = "gpt-4o"
//! describe_tables = true
//! sample_rows = 5
//!
//! [output]
//! directory = "./keyscout-out"
//!
//! [cache]
//! enabled = true
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::discovery::{thresholds, DiscoveryConfig, NameNormalization, Strength};
use crate::llm::{DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "KEYSCOUT_CONFIG";
/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "keyscout.toml";

static ENV_REF: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{([^}]*)\}|\$([A-Za-z0-9_]+)").expect("env pattern is valid")
});

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub source: SourceSettings,
    pub discovery: DiscoverySettings,
    pub llm: LlmSettings,
    pub output: OutputSettings,
    pub cache: CacheSettings,
}

/// Database to analyse.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceSettings {
    /// Datasource driver (only `sqlite` runs queries).
    pub driver: String,

    /// Database path (supports ${ENV_VAR} expansion).
    pub path: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            driver: "sqlite".to_string(),
            path: String::new(),
        }
    }
}

impl SourceSettings {
    /// Get the path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.path)
    }
}

/// Heuristic and verification knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    pub integrity_threshold: f64,
    pub auto_increment_ratio: f64,
    pub min_strength: Strength,
    pub name_normalization: NameNormalization,
    pub fallback_enabled: bool,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            integrity_threshold: thresholds::INTEGRITY,
            auto_increment_ratio: thresholds::AUTO_INCREMENT_RATIO,
            min_strength: Strength::Normal,
            name_normalization: NameNormalization::default(),
            fallback_enabled: true,
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Use the chat completions endpoint for ratings and descriptions.
    pub enabled: bool,

    /// API key (supports ${ENV_VAR} expansion).
    pub api_key: String,

    pub model: String,

    pub base_url: String,

    /// Write `table_descriptions.csv`.
    pub describe_tables: bool,

    /// Rows sampled per table for descriptions.
    pub sample_rows: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: "${OPENAI_API_KEY}".to_string(),
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            describe_tables: true,
            sample_rows: thresholds::SAMPLE_ROWS,
        }
    }
}

impl LlmSettings {
    /// Get the API key with environment variables expanded.
    pub fn resolved_api_key(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.api_key)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Directory receiving the CSV files and the DDL script.
    pub directory: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("keyscout-out"),
        }
    }
}

/// Description cache settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheSettings {
    pub enabled: bool,

    /// Cache database; `~/.keyscout/cache.db` when unset.
    pub path: Option<PathBuf>,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        settings.validate()?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `KEYSCOUT_CONFIG`
    /// 2. `./keyscout.toml`
    /// 3. `~/.config/keyscout/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("keyscout").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject values outside their meaningful range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let d = &self.discovery;
        if !(0.0..=1.0).contains(&d.integrity_threshold) {
            return Err(SettingsError::InvalidConfig(format!(
                "discovery.integrity_threshold must be within [0, 1], got {}",
                d.integrity_threshold
            )));
        }
        if !(0.0..=1.0).contains(&d.auto_increment_ratio) {
            return Err(SettingsError::InvalidConfig(format!(
                "discovery.auto_increment_ratio must be within [0, 1], got {}",
                d.auto_increment_ratio
            )));
        }
        Ok(())
    }

    /// Discovery configuration derived from `[discovery]`.
    ///
    /// The fallback stage only runs with the language model enabled.
    pub fn discovery_config(&self) -> DiscoveryConfig {
        let d = &self.discovery;
        DiscoveryConfig {
            integrity_threshold: d.integrity_threshold,
            auto_increment_ratio: d.auto_increment_ratio,
            min_strength: d.min_strength,
            name_normalization: d.name_normalization,
            fallback_enabled: d.fallback_enabled && self.llm.enabled,
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A `$` not followed by a name is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut missing = None;
    let expanded = ENV_REF.replace_all(s, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        match env::var(name) {
            Ok(value) => value,
            Err(_) => {
                missing.get_or_insert_with(|| name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(name) => Err(SettingsError::MissingEnvVar(name)),
        None => Ok(expanded.into_owned()),
    }
}
