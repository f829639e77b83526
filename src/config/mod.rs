//! Layered host configuration
//!
//! Settings are merged from three layers, last wins:
//! 1. Built-in defaults
//! 2. Host config file (`<config dir>/flagconf/config.toml`)
//! 3. CLI overrides

mod defaults;
mod effective;
mod merge;
mod settings;

pub use defaults::BuiltinDefaults;
pub use effective::{ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig};
pub use merge::{deep_merge, merge_layers};
pub use settings::Settings;

use std::path::PathBuf;

/// Default location of the host config file, if the platform has a config dir.
pub fn default_host_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("flagconf").join("config.toml"))
}
