//! Directory structure synchronization.
//!
//! Runs before any writer so every later stage can assume its target
//! directories exist. Two passes:
//!
//! 1. **Prune**: walk the destination and collect every directory whose
//!    mirrored path does not exist in the source. Deletion happens after
//!    the walk, never while it is in progress. A directory that cannot be
//!    removed becomes a [`Warning`]; the pass carries on.
//! 2. **Create**: walk the source, skipping reserved `__` folders, and
//!    create each missing directory in the destination. A failure here is
//!    fatal.
//!
//! Top-level destination directories produced by the content collections
//! (`articles/`, `blog/`) have no source counterpart; callers list them in
//! `keep` so they survive pruning between runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::diagnostics::Warning;
use crate::walk::{Walk, mirrored_dirs};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("invalid path {path}: {reason}")]
    InvalidPath { path: PathBuf, reason: &'static str },
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Outcome of a synchronization run.
#[derive(Debug, Default)]
pub struct SyncReport {
    pub removed: Vec<PathBuf>,
    pub created: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

/// Align the destination's directory tree with the source's.
pub fn sync(source: &Path, dest: &Path) -> Result<SyncReport, SyncError> {
    sync_with(source, dest, &[])
}

/// Like [`sync`], but never prunes the named top-level destination dirs.
pub fn sync_with(source: &Path, dest: &Path, keep: &[&str]) -> Result<SyncReport, SyncError> {
    ensure_dir(source)?;
    ensure_dir(dest)?;

    let mut report = SyncReport::default();

    for stale in stale_dirs(source, dest, keep)? {
        match fs::remove_dir_all(&stale) {
            Ok(()) => {
                tracing::debug!(path = %stale.display(), "removed stale directory");
                report.removed.push(stale);
            }
            Err(e) => {
                let warning = Warning::StaleDirNotRemoved {
                    path: stale,
                    reason: e.to_string(),
                };
                warning.log();
                report.warnings.push(warning);
            }
        }
    }

    let dirs = mirrored_dirs(source).map_err(|e| SyncError::Io {
        path: source.to_path_buf(),
        source: e,
    })?;
    for dir in dirs {
        let rel = dir.strip_prefix(source).unwrap_or(&dir);
        let target = dest.join(rel);
        if !target.exists() {
            fs::create_dir_all(&target).map_err(|e| SyncError::Io {
                path: target.clone(),
                source: e,
            })?;
            tracing::debug!(path = %target.display(), "created directory");
            report.created.push(target);
        }
    }

    Ok(report)
}

/// Destination directories with no source counterpart, outermost only.
fn stale_dirs(source: &Path, dest: &Path, keep: &[&str]) -> Result<Vec<PathBuf>, SyncError> {
    let mut walk = Walk::new(dest);
    let mut stale = Vec::new();
    while let Some(entry) = walk.next() {
        let entry = entry.map_err(|e| SyncError::Io {
            path: dest.to_path_buf(),
            source: e,
        })?;
        if !entry.is_dir {
            continue;
        }
        let rel = entry.path.strip_prefix(dest).unwrap_or(&entry.path);
        let top_level = rel.components().count() == 1;
        if top_level && keep.contains(&entry.name().as_str()) {
            walk.skip_subtree();
            continue;
        }
        if !source.join(rel).exists() {
            // Everything below goes with it.
            walk.skip_subtree();
            stale.push(entry.path);
        }
    }
    Ok(stale)
}

fn ensure_dir(path: &Path) -> Result<(), SyncError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(SyncError::InvalidPath {
            path: path.to_path_buf(),
            reason: "not a directory",
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(SyncError::InvalidPath {
            path: path.to_path_buf(),
            reason: "does not exist",
        }),
        Err(e) => Err(SyncError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn pair() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn removes_dir_absent_from_source() {
        let (src, dst) = pair();
        fs::create_dir_all(dst.path().join("old/nested")).unwrap();
        fs::write(dst.path().join("old/nested/f.html"), "x").unwrap();

        let report = sync(src.path(), dst.path()).unwrap();
        assert!(!dst.path().join("old").exists());
        assert_eq!(report.removed, vec![dst.path().join("old")]);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn creates_dir_present_in_source() {
        let (src, dst) = pair();
        fs::create_dir_all(src.path().join("fresh/deeper")).unwrap();

        let report = sync(src.path(), dst.path()).unwrap();
        assert!(dst.path().join("fresh").is_dir());
        assert!(dst.path().join("fresh/deeper").is_dir());
        assert_eq!(fs::read_dir(dst.path().join("fresh/deeper")).unwrap().count(), 0);
        assert_eq!(report.created.len(), 2);
    }

    #[test]
    fn reserved_source_dirs_not_mirrored() {
        let (src, dst) = pair();
        fs::create_dir_all(src.path().join("__settings")).unwrap();
        fs::create_dir_all(src.path().join("__blog/2021")).unwrap();
        fs::create_dir_all(src.path().join("docs")).unwrap();

        sync(src.path(), dst.path()).unwrap();
        assert!(!dst.path().join("__settings").exists());
        assert!(!dst.path().join("__blog").exists());
        assert!(dst.path().join("docs").is_dir());
    }

    #[test]
    fn existing_matching_dirs_untouched() {
        let (src, dst) = pair();
        fs::create_dir_all(src.path().join("docs")).unwrap();
        fs::create_dir_all(dst.path().join("docs")).unwrap();
        fs::write(dst.path().join("docs/page.html"), "keep me").unwrap();

        let report = sync(src.path(), dst.path()).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.created.is_empty());
        assert_eq!(
            fs::read_to_string(dst.path().join("docs/page.html")).unwrap(),
            "keep me"
        );
    }

    #[test]
    fn kept_generated_dirs_survive() {
        let (src, dst) = pair();
        fs::create_dir_all(dst.path().join("blog/posts")).unwrap();
        fs::create_dir_all(dst.path().join("old")).unwrap();

        sync_with(src.path(), dst.path(), &["blog"]).unwrap();
        assert!(dst.path().join("blog/posts").is_dir());
        assert!(!dst.path().join("old").exists());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let (src, dst) = pair();
        fs::create_dir_all(src.path().join("a/b")).unwrap();
        fs::create_dir_all(dst.path().join("z")).unwrap();

        sync(src.path(), dst.path()).unwrap();
        let again = sync(src.path(), dst.path()).unwrap();
        assert!(again.removed.is_empty());
        assert!(again.created.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unremovable_stale_dir_is_a_warning() {
        use std::os::unix::fs::PermissionsExt;

        let (src, dst) = pair();
        fs::create_dir_all(src.path().join("fresh")).unwrap();
        let locked = dst.path().join("old/locked");
        fs::create_dir_all(&locked).unwrap();
        fs::write(locked.join("page.html"), "x").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

        // Root ignores directory permissions.
        if fs::write(locked.join("writable"), "").is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = sync(src.path(), dst.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let report = result.unwrap();
        assert!(report.removed.is_empty());
        assert_eq!(report.warnings.len(), 1);
        assert!(matches!(
            &report.warnings[0],
            Warning::StaleDirNotRemoved { path, .. } if *path == dst.path().join("old")
        ));
        assert!(dst.path().join("fresh").is_dir());
        assert_eq!(report.created, vec![dst.path().join("fresh")]);
    }

    #[test]
    fn missing_source_is_invalid_path() {
        let dst = TempDir::new().unwrap();
        let result = sync(&dst.path().join("nope"), dst.path());
        assert!(matches!(
            result,
            Err(SyncError::InvalidPath {
                reason: "does not exist",
                ..
            })
        ));
    }

    #[test]
    fn file_as_destination_is_invalid_path() {
        let (src, dst) = pair();
        let file = dst.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let result = sync(src.path(), &file);
        assert!(matches!(
            result,
            Err(SyncError::InvalidPath {
                reason: "not a directory",
                ..
            })
        ));
    }
}
