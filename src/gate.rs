//! Confirmation gate
//!
//! Sources run arbitrary logic with the host's privileges, so every source
//! other than the trusted global fallback may require the user's consent
//! before it is loaded. The resolver memoises the outcome per location; the
//! gate itself only makes the decision.

use std::path::{Path, PathBuf};

use crate::ancestry;
use crate::host::{Host, CONFIRM_CONF_VAR, GLOBAL_CONF_VAR};

/// Prompt shown before loading a source.
pub fn confirm_message(location: &Path) -> String {
    format!("Found {}. Load?", location.display())
}

/// Outcome of a gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Global fallback, never prompted for.
    Trusted,
    /// User accepted the prompt.
    Confirmed,
    /// Confirmation is switched off.
    NotRequired,
    /// User declined the prompt.
    Declined,
}

impl GateDecision {
    pub fn allows_load(self) -> bool {
        !matches!(self, GateDecision::Declined)
    }
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(raw)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationGate {
    global_conf: Option<PathBuf>,
}

impl ConfirmationGate {
    pub fn new(global_conf: Option<PathBuf>) -> Self {
        Self { global_conf }
    }

    /// Read the global fallback location from the host. Done once.
    ///
    /// Relative values are resolved against the current directory here, so
    /// the location compares equal to the absolute candidates the ancestry
    /// walk produces.
    pub fn from_host<H: Host + ?Sized>(host: &H) -> Self {
        let global_conf = host
            .string_variable(GLOBAL_CONF_VAR)
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| {
                let path = expand_home(raw.trim());
                match ancestry::absolutize(&path) {
                    Ok(abs) => Some(abs),
                    Err(e) => {
                        tracing::warn!(
                            global = %path.display(),
                            error = %e,
                            "cannot resolve global configuration source, ignoring it"
                        );
                        None
                    }
                }
            });
        Self { global_conf }
    }

    pub fn global_conf(&self) -> Option<&Path> {
        self.global_conf.as_deref()
    }

    pub fn is_global(&self, location: &Path) -> bool {
        self.global_conf.as_deref() == Some(location)
    }

    /// Decide whether `location` may be loaded, prompting if required.
    ///
    /// The confirmation toggle is read on every call; it defaults to on.
    pub fn check<H: Host + ?Sized>(&self, location: &Path, host: &mut H) -> GateDecision {
        if self.is_global(location) {
            return GateDecision::Trusted;
        }

        if !host.bool_variable(CONFIRM_CONF_VAR).unwrap_or(true) {
            return GateDecision::NotRequired;
        }

        if host.confirm(&confirm_message(location)) {
            GateDecision::Confirmed
        } else {
            GateDecision::Declined
        }
    }
}
