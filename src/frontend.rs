//! Native front end collaborator
//!
//! The front end ships its own copy of the compiler's builtin headers next to
//! its installation; every resolved flag vector points at them.

use serde::Serialize;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};

/// Directory, relative to the front end install dir, holding bundled headers.
pub const SPECIAL_INCLUDES_DIR: &str = "clang_includes";

/// Final, sanitized flag vector handed to the front end.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagVec(Vec<String>);

impl FlagVec {
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for FlagVec {
    type Target = [String];

    fn deref(&self) -> &[String] {
        &self.0
    }
}

impl From<Vec<String>> for FlagVec {
    fn from(flags: Vec<String>) -> Self {
        Self(flags)
    }
}

/// Directory holding the running executable.
pub fn current_exe_dir() -> io::Result<PathBuf> {
    let exe = std::env::current_exe()?;
    exe.parent().map(Path::to_path_buf).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("executable {} has no parent directory", exe.display()),
        )
    })
}

/// Handle on the native front end installation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontEnd {
    install_dir: PathBuf,
}

impl FrontEnd {
    pub fn new(install_dir: impl Into<PathBuf>) -> Self {
        Self {
            install_dir: install_dir.into(),
        }
    }

    /// Front end installed alongside the running executable.
    pub fn from_current_exe() -> io::Result<Self> {
        Ok(Self::new(current_exe_dir()?))
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Flags pointing the front end at its bundled headers.
    pub fn special_includes(&self) -> Vec<String> {
        let includes = self.install_dir.join(SPECIAL_INCLUDES_DIR);
        vec!["-I".to_string(), includes.to_string_lossy().into_owned()]
    }
}
