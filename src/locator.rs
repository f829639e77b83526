//! Configuration source locator
//!
//! Turns the ancestry of a file into the ordered list of configuration
//! sources that exist on disk, with the global fallback last.

use std::path::{Path, PathBuf};

use crate::ancestry::ParentDirs;

/// Name of the configuration source searched for in every ancestor.
pub const CONF_FILENAME: &str = ".flagconf";

/// Lazy sequence of candidate configuration sources for one file.
///
/// Existence is checked when each candidate is reached, not up front. The
/// global fallback is yielded after the walk even if the walk already
/// produced the same path; deduplication is the caller's job.
#[derive(Debug, Clone)]
pub struct ConfSources {
    dirs: ParentDirs,
    global: Option<PathBuf>,
}

impl ConfSources {
    /// Candidates for an absolute file path.
    pub fn for_file(file: &Path, global: Option<PathBuf>) -> Self {
        Self {
            dirs: ParentDirs::for_file(file),
            global,
        }
    }
}

impl Iterator for ConfSources {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        for dir in self.dirs.by_ref() {
            let candidate = dir.join(CONF_FILENAME);
            if candidate.exists() {
                tracing::trace!(candidate = %candidate.display(), "found configuration source");
                return Some(candidate);
            }
        }

        self.global.take().filter(|global| global.exists())
    }
}
