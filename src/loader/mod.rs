//! Configuration source loading
//!
//! A configuration source is loaded once into an isolated, uniquely named
//! unit and then queried through the narrow [`FlagsModule`] interface.
//! - [`ModuleLoader`]: the loading seam the resolver is generic over
//! - [`ProcessLoader`]: runs each source as a child process speaking the
//!   line-delimited JSON protocol
//! - [`SearchPath`]: directories exposed to sources while they load

mod process;
mod search_path;

pub use process::{ProcessLoader, ProcessModule, SEARCH_PATH_ENV, UNIT_ENV};
pub use search_path::{SearchPath, SearchPathGuard};

use std::io;
use std::path::Path;

use flagconf_protocol::{FlagsResult, ProtocolError};
use rand::Rng;

/// Length of generated unit names.
pub const UNIT_NAME_LEN: usize = 15;

/// A loaded configuration source.
pub trait FlagsModule {
    /// Unique name of the unit this source was loaded into.
    fn unit_name(&self) -> &str;

    /// Ask the source for the flags of an absolute file path.
    fn flags_for_file(&mut self, filename: &Path) -> Result<FlagsResult, ModuleError>;
}

/// Loads configuration sources.
pub trait ModuleLoader {
    /// Load the source at `location` into a fresh unit.
    fn load(&mut self, location: &Path) -> Result<Box<dyn FlagsModule>, ModuleError>;
}

/// Random unit name: lowercase ASCII letters, independent of the location.
pub fn random_unit_name() -> String {
    let mut rng = rand::thread_rng();
    (0..UNIT_NAME_LEN)
        .map(|_| char::from(rng.gen_range(b'a'..=b'z')))
        .collect()
}

/// Load and query failures
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("source exited: {0}")]
    Exited(String),

    #[error("source was stopped after a protocol error")]
    Stopped,

    #[error("search path cannot be passed to the source: {0}")]
    SearchPath(String),

    #[error("{0}")]
    Failed(String),
}
