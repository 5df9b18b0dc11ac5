//! Incremental compilation of the source tree.
//!
//! Runs after the content collections. Every file that survives the
//! reserved-prefix rules (see [`crate::walk::compilable_files`]) takes one of
//! two paths:
//!
//! - **Pages** (a configured page extension, outside the assets folder) are
//!   rendered through the [`Renderer`] with a context holding only their
//!   slug, then written through the [`HashCache`]. Every page except the
//!   not-found page gets a sitemap entry.
//! - **Everything else** is copied byte-for-byte. An existing destination
//!   file is only replaced when its checksum differs from the source's.
//!
//! Files whose top-level destination name is claimed by generated output
//! (`sitemap.xml`, `qa.html`, `articles/`, `blog/`) are not compiled at all;
//! each one becomes a [`Warning::OutputCollision`].
//!
//! The first error aborts the pass. Files already written stay in place;
//! the cache makes a re-run pick up where this one stopped.

use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::{CacheError, CacheStats, HashCache, checksum_file, copy_permissions};
use crate::config::SiteConfig;
use crate::diagnostics::Warning;
use crate::naming::{is_not_found, path_slug, top_segment, url_path};
use crate::sitemap::Sitemap;
use crate::template::{Renderer, TemplateError};
use crate::walk::compilable_files;

#[derive(Error, Debug)]
pub enum CompileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

fn io_err(path: &Path) -> impl FnOnce(io::Error) -> CompileError + '_ {
    move |source| CompileError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Context handed to every compiled page.
#[derive(Debug, Serialize)]
struct PageContext<'a> {
    slug: &'a str,
}

/// What one compile pass did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CompileStats {
    /// Rendered pages, split by cache decision.
    pub rendered: CacheStats,
    /// Opaque files copied because they were new or differed.
    pub copied: u32,
    /// Opaque files left alone because they matched.
    pub identical: u32,
    /// Source files skipped because generated output owns their destination.
    pub warnings: Vec<Warning>,
}

impl fmt::Display for CompileStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pages: {}; files: {} copied", self.rendered, self.copied)?;
        if self.identical > 0 {
            write!(f, ", {} identical", self.identical)?;
        }
        Ok(())
    }
}

/// How a source file is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Render,
    Copy,
}

fn classify(rel: &Path, config: &SiteConfig) -> Action {
    let is_page = rel
        .extension()
        .is_some_and(|ext| config.is_page_extension(&ext.to_string_lossy()));
    let in_assets = top_segment(rel).is_some_and(|top| top == config.assets_dir);
    if is_page && !in_assets {
        Action::Render
    } else {
        Action::Copy
    }
}

/// Compile every eligible file under `source` into `dest`.
///
/// `claimed` lists top-level destination names written by other stages.
/// Destination directories must already exist (see [`crate::sync`]).
pub fn compile(
    source: &Path,
    dest: &Path,
    renderer: &Renderer,
    cache: &HashCache,
    config: &SiteConfig,
    claimed: &[&str],
    sitemap: &mut Sitemap,
) -> Result<CompileStats, CompileError> {
    let mut stats = CompileStats::default();

    for file in compilable_files(source) {
        let file = file.map_err(io_err(source))?;
        let rel = file.strip_prefix(source).unwrap_or(&file);
        let target = dest.join(rel);

        if let Some(output) = top_segment(rel).filter(|top| claimed.contains(&top.as_str())) {
            let warning = Warning::OutputCollision {
                path: file.clone(),
                output,
            };
            warning.log();
            stats.warnings.push(warning);
            continue;
        }

        match classify(rel, config) {
            Action::Render => {
                let slug = path_slug(rel);
                let html = renderer.render(&file, &PageContext { slug: &slug }, &slug)?;
                let outcome =
                    cache.write_if_changed(&slug, &target, html.as_bytes(), Some(&file))?;
                stats.rendered.record(outcome);
                if !is_not_found(&slug, &config.not_found_page) {
                    sitemap.push(&url_path(rel));
                }
            }
            Action::Copy => {
                if copy_if_changed(&file, &target)? {
                    stats.copied += 1;
                } else {
                    stats.identical += 1;
                }
            }
        }
    }

    tracing::info!(%stats, "compiled source tree");
    Ok(stats)
}

/// Copy `src` over `dest` unless both already hold the same bytes.
///
/// Returns whether a copy happened. The copy keeps the source's permission
/// bits, plus owner write.
fn copy_if_changed(src: &Path, dest: &Path) -> Result<bool, CompileError> {
    if dest.exists() && checksum_file(src)? == checksum_file(dest)? {
        tracing::debug!(path = %dest.display(), "identical");
        return Ok(false);
    }
    fs::copy(src, dest).map_err(io_err(dest))?;
    copy_permissions(src, dest)?;
    tracing::debug!(path = %dest.display(), "copied");
    Ok(true)
}
