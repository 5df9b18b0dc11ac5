//! Checksum cache for incremental builds.
//!
//! Rendering is cheap, but rewriting an unchanged page still bumps its
//! modification time and makes every deploy re-upload the whole site. This
//! module lets every writer skip files whose content is unchanged since the
//! last run.
//!
//! # Design
//!
//! The cache is keyed by **slug**, not by output path or source mtime. For
//! each slug a single file `<source>/__hash/<slug>.crc` holds the decimal
//! CRC-32 (IEEE) of the content last written for it. The cache lives in the
//! source tree so it survives wiping or re-cloning the destination; missing
//! destination files are detected separately and always rewritten.
//!
//! A write happens when any of these holds:
//! 1. The destination file does not exist
//! 2. No cache entry exists for the slug (or it cannot be parsed)
//! 3. The new content's checksum differs from the cached one
//! 4. The cache is bypassed for this run (`--no-cache`)
//!
//! The destination's current bytes are not consulted. Outputs that other
//! writers may clobber between runs use [`write_if_different`] instead,
//! which compares against the file on disk.
//!
//! Entries are never pruned. A deleted source page leaves its `.crc` file
//! behind, which is harmless: nothing looks it up again.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of per-slug cache entry files.
const ENTRY_EXTENSION: &str = "crc";

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CacheError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// CRC-32 (IEEE polynomial) of a byte slice.
pub fn checksum(bytes: &[u8]) -> u32 {
    crc32fast::hash(bytes)
}

/// CRC-32 of a file's contents.
pub fn checksum_file(path: &Path) -> Result<u32, CacheError> {
    let bytes = fs::read(path).map_err(|e| CacheError::io(path, e))?;
    Ok(checksum(&bytes))
}

/// What [`HashCache::write_if_changed`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    Unchanged,
}

/// Per-slug checksum store rooted at a directory.
#[derive(Debug, Clone)]
pub struct HashCache {
    dir: PathBuf,
    bypass: bool,
}

impl HashCache {
    /// Open a cache rooted at `dir`. The directory is created on first write.
    ///
    /// With `bypass` set, lookups always miss but entries are still written,
    /// so the next normal run starts from fresh checksums.
    pub fn new(dir: &Path, bypass: bool) -> Self {
        Self {
            dir: dir.to_path_buf(),
            bypass,
        }
    }

    pub fn entry_path(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{slug}.{ENTRY_EXTENSION}"))
    }

    /// Cached checksum for `slug`, or `None` on a miss.
    ///
    /// An entry that cannot be parsed is treated as a miss.
    pub fn get(&self, slug: &str) -> Result<Option<u32>, CacheError> {
        if self.bypass {
            return Ok(None);
        }
        let path = self.entry_path(slug);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(raw.trim().parse::<u32>().ok()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::io(&path, e)),
        }
    }

    /// Record the checksum for `slug`.
    pub fn put(&self, slug: &str, sum: u32) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir).map_err(|e| CacheError::io(&self.dir, e))?;
        let path = self.entry_path(slug);
        fs::write(&path, sum.to_string()).map_err(|e| CacheError::io(&path, e))
    }

    /// Write `content` to `dest` unless the cache proves it unchanged.
    ///
    /// When `permissions_from` is given, the written file takes that file's
    /// permissions.
    pub fn write_if_changed(
        &self,
        slug: &str,
        dest: &Path,
        content: &[u8],
        permissions_from: Option<&Path>,
    ) -> Result<WriteOutcome, CacheError> {
        let sum = checksum(content);
        if dest.exists() && self.get(slug)? == Some(sum) {
            tracing::debug!(slug, "unchanged");
            return Ok(WriteOutcome::Unchanged);
        }

        fs::write(dest, content).map_err(|e| CacheError::io(dest, e))?;
        if let Some(src) = permissions_from {
            copy_permissions(src, dest)?;
        }
        self.put(slug, sum)?;
        tracing::debug!(slug, dest = %dest.display(), "written");
        Ok(WriteOutcome::Written)
    }
}

/// Write `content` to `dest` unless the file already holds exactly these bytes.
pub fn write_if_different(dest: &Path, content: &[u8]) -> Result<WriteOutcome, CacheError> {
    match fs::read(dest) {
        Ok(existing) if existing == content => {
            tracing::debug!(dest = %dest.display(), "unchanged");
            return Ok(WriteOutcome::Unchanged);
        }
        Ok(_) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(CacheError::io(dest, e)),
    }
    fs::write(dest, content).map_err(|e| CacheError::io(dest, e))?;
    tracing::debug!(dest = %dest.display(), "written");
    Ok(WriteOutcome::Written)
}

/// Give `dest` the permissions of `src`, keeping it writable by its owner
/// so later rewrites succeed.
pub(crate) fn copy_permissions(src: &Path, dest: &Path) -> Result<(), CacheError> {
    let perms = fs::metadata(src)
        .map_err(|e| CacheError::io(src, e))?
        .permissions();
    fs::set_permissions(dest, owner_writable(perms)).map_err(|e| CacheError::io(dest, e))
}

#[cfg(unix)]
fn owner_writable(mut perms: fs::Permissions) -> fs::Permissions {
    use std::os::unix::fs::PermissionsExt;
    perms.set_mode(perms.mode() | 0o200);
    perms
}

#[cfg(not(unix))]
#[allow(clippy::permissions_set_readonly_false)]
fn owner_writable(mut perms: fs::Permissions) -> fs::Permissions {
    perms.set_readonly(false);
    perms
}

/// Summary of cache decisions for a stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub written: u32,
    pub unchanged: u32,
}

impl CacheStats {
    pub fn record(&mut self, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Written => self.written += 1,
            WriteOutcome::Unchanged => self.unchanged += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.written + self.unchanged
    }

    pub fn absorb(&mut self, other: CacheStats) {
        self.written += other.written;
        self.unchanged += other.unchanged;
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unchanged > 0 {
            write!(
                f,
                "{} written, {} unchanged ({} total)",
                self.written,
                self.unchanged,
                self.total()
            )
        } else {
            write!(f, "{} written", self.written)
        }
    }
}
