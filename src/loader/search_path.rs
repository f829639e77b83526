//! Search path exposed to configuration sources.

use std::ffi::OsString;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Ordered list of directories a source may pull helper logic from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Parse a platform path list (e.g. the value of an environment variable).
    pub fn from_env_value(value: &std::ffi::OsStr) -> Self {
        Self {
            dirs: std::env::split_paths(value).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Encode as a platform path list.
    pub fn to_env_value(&self) -> Result<OsString, std::env::JoinPathsError> {
        std::env::join_paths(&self.dirs)
    }

    /// Put `dir` first until the returned guard is dropped.
    ///
    /// The previous list is restored on drop, whether the guarded work
    /// succeeded, failed, or panicked.
    pub fn prioritize(&mut self, dir: &Path) -> SearchPathGuard<'_> {
        let saved = self.dirs.clone();
        self.dirs.insert(0, dir.to_path_buf());
        SearchPathGuard { path: self, saved }
    }
}

/// Scoped prioritisation of one directory; see [`SearchPath::prioritize`].
#[derive(Debug)]
pub struct SearchPathGuard<'a> {
    path: &'a mut SearchPath,
    saved: Vec<PathBuf>,
}

impl Deref for SearchPathGuard<'_> {
    type Target = SearchPath;

    fn deref(&self) -> &SearchPath {
        self.path
    }
}

impl Drop for SearchPathGuard<'_> {
    fn drop(&mut self) {
        self.path.dirs = std::mem::take(&mut self.saved);
    }
}
