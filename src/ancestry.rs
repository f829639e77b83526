//! Path ancestry walker
//!
//! Produces the directories containing a file, nearest first, ending at the
//! filesystem root. Pure path arithmetic: nothing here touches the disk,
//! except [`absolutize`] reading the current directory for relative input.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically normalise an absolute path: drop `.`, resolve `..`.
///
/// `..` never climbs above the root. Symlinks are not resolved.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Make `path` absolute against the current directory, then normalise it.
pub fn absolutize(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize(path))
    } else {
        Ok(normalize(&std::env::current_dir()?.join(path)))
    }
}

/// Lazy walk from a directory up to the root, nearest first.
///
/// Cloning a walk restarts it from wherever the clone was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentDirs {
    next: Option<PathBuf>,
}

impl ParentDirs {
    /// Walk starting at `dir` itself.
    pub fn starting_at(dir: PathBuf) -> Self {
        let next = if dir.as_os_str().is_empty() {
            None
        } else {
            Some(dir)
        };
        Self { next }
    }

    /// Walk starting at the directory containing `file`, which must already
    /// be absolute.
    pub fn for_file(file: &Path) -> Self {
        Self::starting_at(normalize(file.parent().unwrap_or(file)))
    }
}

impl Iterator for ParentDirs {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        let current = self.next.take()?;
        self.next = current
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf);
        Some(current)
    }
}

impl std::iter::FusedIterator for ParentDirs {}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[cfg(unix)]
    #[test]
    fn test_nearest_first_root_last() {
        let dirs: Vec<PathBuf> = ParentDirs::for_file(Path::new("/a/b/c/file.txt")).collect();
        assert_eq!(dirs, paths(&["/a/b/c", "/a/b", "/a", "/"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_root_is_a_real_root() {
        let last = ParentDirs::for_file(Path::new("/a/file.txt")).last().unwrap();
        assert_eq!(last, PathBuf::from("/"));
        assert!(last.has_root());
        assert!(!last.as_os_str().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_file_at_root() {
        let dirs: Vec<PathBuf> = ParentDirs::for_file(Path::new("/file.txt")).collect();
        assert_eq!(dirs, paths(&["/"]));
    }

    #[cfg(unix)]
    #[test]
    fn test_walk_is_restartable() {
        let walk = ParentDirs::for_file(Path::new("/x/y/z.c"));
        let first: Vec<PathBuf> = walk.clone().collect();
        let second: Vec<PathBuf> = walk.collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_normalize_dots() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../..")), PathBuf::from("/"));
        assert_eq!(normalize(Path::new("/a/b/")), PathBuf::from("/a/b"));
    }

    #[cfg(unix)]
    #[test]
    fn test_dotted_file_path() {
        let dirs: Vec<PathBuf> = ParentDirs::for_file(Path::new("/a/b/../c/f.h")).collect();
        assert_eq!(dirs, paths(&["/a/c", "/a", "/"]));
    }

    #[test]
    fn test_relative_input_becomes_absolute() {
        let cwd = std::env::current_dir().unwrap();
        let file = absolutize(Path::new("src/main.c")).unwrap();
        let dirs: Vec<PathBuf> = ParentDirs::for_file(&file).collect();
        assert_eq!(dirs[0], normalize(&cwd.join("src")));
        assert!(dirs.iter().all(|d| d.is_absolute()));
        assert_eq!(dirs.last().unwrap().parent(), None);
    }

    #[test]
    fn test_bare_filename_starts_at_cwd() {
        let cwd = std::env::current_dir().unwrap();
        let first = ParentDirs::for_file(&absolutize(Path::new("main.c")).unwrap())
            .next()
            .unwrap();
        assert_eq!(first, normalize(&cwd));
    }
}
