//! Operation-specific payloads.

use serde::{Deserialize, Serialize};

/// Known operation names.
pub mod names {
    /// Handshake sent once right after the source is spawned.
    pub const LOAD: &str = "load";
    /// Per-file flag query.
    pub const FLAGS_FOR_FILE: &str = "flags_for_file";
}

/// Load handshake payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadRequest {
    /// Unique name of the unit the source was loaded into.
    pub unit: String,
    /// Location the source was loaded from.
    pub location: String,
}

/// Load handshake acknowledgement. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadResponse {
    /// Human-readable name of the source, for logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Per-file flag query payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagsForFileRequest {
    /// Absolute path of the file flags are requested for.
    pub filename: String,
}

/// Result record returned by a configuration source for one file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlagsResult {
    /// Raw compiler flags, in order.
    pub flags: Vec<String>,

    /// False while the source is still computing flags; the caller should
    /// ask again later and must not cache anything.
    #[serde(default = "default_true")]
    pub flags_ready: bool,

    /// Whether the caller may cache the final flags for this file.
    #[serde(default = "default_true")]
    pub do_cache: bool,
}

fn default_true() -> bool {
    true
}

impl FlagsResult {
    /// Ready, cacheable result.
    pub fn new(flags: Vec<String>) -> Self {
        Self {
            flags,
            flags_ready: true,
            do_cache: true,
        }
    }

    /// Result that must not be cached.
    pub fn uncached(flags: Vec<String>) -> Self {
        Self {
            do_cache: false,
            ..Self::new(flags)
        }
    }

    /// Result signalling the source is not ready yet.
    pub fn not_ready() -> Self {
        Self {
            flags: Vec::new(),
            flags_ready: false,
            do_cache: true,
        }
    }
}
