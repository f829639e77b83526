//! Host editor collaborator
//!
//! The resolver never talks to a UI directly. Variable lookup, messages and
//! the blocking yes/no prompt all go through [`Host`], so the core logic can
//! be driven by a terminal, an editor integration, or a test double.

mod terminal;

pub use terminal::{prompt_yes_no, TerminalHost};

use serde_json::Value;

/// Path of the trusted global fallback source (string, empty = none).
pub const GLOBAL_CONF_VAR: &str = "global_conf";

/// Whether loading a non-global source needs confirmation (bool).
pub const CONFIRM_CONF_VAR: &str = "confirm_conf";

/// Capabilities the resolver needs from its host.
pub trait Host {
    /// Look up a configuration value by name.
    fn variable(&self, name: &str) -> Option<Value>;

    /// Show a message to the user. Fire and forget.
    fn post_message(&mut self, message: &str);

    /// Ask a yes/no question, blocking until answered.
    fn confirm(&mut self, message: &str) -> bool;

    fn bool_variable(&self, name: &str) -> Option<bool> {
        self.variable(name).and_then(|v| v.as_bool())
    }

    fn string_variable(&self, name: &str) -> Option<String> {
        self.variable(name)
            .and_then(|v| v.as_str().map(str::to_string))
    }
}
