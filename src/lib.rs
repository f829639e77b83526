//! flagconf - per-file compile flag resolution
//!
//! Finds the `.flagconf` configuration source nearest to a file (falling
//! back to a trusted global one), loads it once per session behind a user
//! confirmation, asks it for the file's compile flags, and sanitizes the
//! answer before it reaches the native front end.

pub mod ancestry;
pub mod config;
pub mod error;
pub mod frontend;
pub mod gate;
pub mod host;
pub mod loader;
pub mod locator;
pub mod mock;
pub mod resolver;

pub use error::FlagsError;
pub use frontend::{FlagVec, FrontEnd};
pub use gate::{ConfirmationGate, GateDecision};
pub use host::{Host, TerminalHost};
pub use loader::{FlagsModule, ModuleError, ModuleLoader, ProcessLoader};
pub use locator::{ConfSources, CONF_FILENAME};
pub use resolver::{Flags, RegistryEntry};

pub use flagconf_protocol::FlagsResult;
pub use flagconf_sanitizer::{sanitize, sanitize_flags};
