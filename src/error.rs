//! Resolver errors

use std::io;
use std::path::PathBuf;

use crate::loader::ModuleError;

/// Errors surfaced by [`crate::Flags::resolve`].
///
/// Declined confirmation, missing configuration and deferred results are not
/// errors; they resolve to `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum FlagsError {
    #[error("cannot resolve path {}: {source}", path.display())]
    Path {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to load configuration source {}: {source}", location.display())]
    Load {
        location: PathBuf,
        #[source]
        source: ModuleError,
    },

    #[error("configuration source {} failed for {}: {source}", location.display(), file.display())]
    Query {
        location: PathBuf,
        file: PathBuf,
        #[source]
        source: ModuleError,
    },
}
