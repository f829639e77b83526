//! Sanitizer result types.

use serde::{Deserialize, Serialize};

/// Machine-readable record of a dropped flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "detail")]
pub enum DroppedFlag {
    /// Exact marker, with the argument it consumed (None if it was last).
    #[serde(rename = "DENIED_FLAG")]
    DeniedFlag {
        flag: String,
        argument: Option<String>,
    },

    /// Token that starts with a marker; dropped without an argument.
    #[serde(rename = "DENIED_PREFIX")]
    DeniedPrefix(String),
}

impl DroppedFlag {
    /// Get a machine-readable string representation.
    pub fn to_code(&self) -> String {
        match self {
            DroppedFlag::DeniedFlag {
                flag,
                argument: Some(arg),
            } => format!("DENIED_FLAG:{} {}", flag, arg),
            DroppedFlag::DeniedFlag {
                flag,
                argument: None,
            } => format!("DENIED_FLAG:{}", flag),
            DroppedFlag::DeniedPrefix(f) => format!("DENIED_PREFIX:{}", f),
        }
    }
}

/// Result of sanitizing a flag sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SanitizeResult {
    /// Kept flags, in their original relative order.
    pub flags: Vec<String>,

    /// Dropped entries, in the order they were dropped.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<DroppedFlag>,
}

impl SanitizeResult {
    /// True when nothing was dropped.
    pub fn is_clean(&self) -> bool {
        self.dropped.is_empty()
    }
}
