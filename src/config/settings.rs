//! Typed view over the settings the loader and front end need.
//!
//! `global_conf` and `confirm_conf` are not here: the resolver
//! reads those through the host's variable lookup.

use std::path::PathBuf;

use super::effective::EffectiveConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Program used to run configuration sources.
    pub interpreter: Option<String>,
    /// Native front end installation directory.
    pub frontend_dir: Option<PathBuf>,
    /// Directory of helper logic exposed to sources during load.
    pub helper_dir: Option<PathBuf>,
}

impl Settings {
    pub fn from_config(config: &EffectiveConfig) -> Self {
        let non_empty = |key: &str| {
            config
                .get_str(key)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Self {
            interpreter: non_empty("interpreter"),
            frontend_dir: non_empty("frontend_dir").map(|d| crate::gate::expand_home(&d)),
            helper_dir: non_empty("helper_dir").map(|d| crate::gate::expand_home(&d)),
        }
    }
}
