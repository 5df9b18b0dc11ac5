//! Depth-first filesystem traversal.
//!
//! [`Walk`] wraps `walkdir` into a lazy sequence of [`Entry`] values in
//! file-name order, so every stage sees the same deterministic order and
//! the sitemap comes out identical between runs. A caller that does not
//! want to descend into the directory it was just handed calls
//! [`Walk::skip_subtree`]. The root itself is never yielded.
//!
//! A walk cannot be rewound; build a new one from the same root to
//! traverse again.

use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::layout::{is_reserved_dir, is_reserved_entry};

/// One visited filesystem entry.
#[derive(Debug, Clone)]
pub struct Entry {
    pub path: PathBuf,
    pub is_dir: bool,
}

impl Entry {
    /// Final path component as UTF-8 (lossy).
    pub fn name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

pub struct Walk {
    inner: walkdir::IntoIter,
}

impl Walk {
    /// Recursive walk of everything below `root`.
    pub fn new(root: &Path) -> Self {
        Self::with_depth(root, usize::MAX)
    }

    /// Walk only the direct children of `root`.
    pub fn shallow(root: &Path) -> Self {
        Self::with_depth(root, 1)
    }

    fn with_depth(root: &Path, max_depth: usize) -> Self {
        let inner = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .sort_by_file_name()
            .into_iter();
        Self { inner }
    }

    /// Do not descend into the directory most recently yielded.
    pub fn skip_subtree(&mut self) {
        self.inner.skip_current_dir();
    }
}

impl Iterator for Walk {
    type Item = io::Result<Entry>;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = match self.inner.next()? {
            Ok(e) => e,
            Err(e) => return Some(Err(io::Error::from(e))),
        };
        Some(Ok(Entry {
            is_dir: entry.file_type().is_dir(),
            path: entry.into_path(),
        }))
    }
}

/// Source directories that should exist in the destination.
///
/// Skips every subtree whose name starts with the reserved `__` prefix.
pub fn mirrored_dirs(root: &Path) -> io::Result<Vec<PathBuf>> {
    let mut walk = Walk::new(root);
    let mut dirs = Vec::new();
    while let Some(entry) = walk.next() {
        let entry = entry?;
        if !entry.is_dir {
            continue;
        }
        if is_reserved_dir(&entry.name()) {
            walk.skip_subtree();
            continue;
        }
        dirs.push(entry.path);
    }
    Ok(dirs)
}

/// Files the compiler should look at.
///
/// Directories starting with `_` (which includes every reserved `__` folder)
/// are not descended into; files starting with `_` are skipped while their
/// siblings are still visited.
pub fn compilable_files(root: &Path) -> CompilableFiles {
    CompilableFiles {
        walk: Walk::new(root),
    }
}

pub struct CompilableFiles {
    walk: Walk,
}

impl Iterator for CompilableFiles {
    type Item = io::Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let entry = match self.walk.next()? {
                Ok(e) => e,
                Err(e) => return Some(Err(e)),
            };
            if !is_reserved_entry(&entry.name()) {
                if !entry.is_dir {
                    return Some(Ok(entry.path));
                }
            } else if entry.is_dir {
                self.walk.skip_subtree();
            }
        }
    }
}

/// XML record files under `dir`, recursively or not, in file-name order.
pub fn xml_files(dir: &Path, recursive: bool) -> io::Result<Vec<PathBuf>> {
    let walk = if recursive {
        Walk::new(dir)
    } else {
        Walk::shallow(dir)
    };
    let mut files = Vec::new();
    for entry in walk {
        let entry = entry?;
        let is_xml = entry
            .path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("xml"));
        if !entry.is_dir && is_xml {
            files.push(entry.path);
        }
    }
    Ok(files)
}
