//! Built-in defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Global fallback source (default: "" = none)
    pub global_conf: String,

    /// Ask before loading non-global sources (default: true)
    pub confirm_conf: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            global_conf: String::new(),
            confirm_conf: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "global_conf": self.global_conf,
            "confirm_conf": self.confirm_conf,
        })
    }
}
