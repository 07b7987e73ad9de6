//! Configuration for keyscout.
//!
//! Settings are read from a TOML file; string values may reference
//! environment variables.

mod settings;

pub use settings::{
    expand_env_vars, CacheSettings, DiscoverySettings, LlmSettings, OutputSettings, Settings,
    SettingsError, SourceSettings, CONFIG_ENV_VAR, LOCAL_CONFIG_FILE,
};
