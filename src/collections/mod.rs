//! Content collections built from XML records.
//!
//! Each collection reads one reserved source folder, sorts its records and
//! renders them through a template from the settings folder:
//!
//! | Collection | Source | Templates | Output |
//! |---|---|---|---|
//! | [`articles`] | `__articles/*.xml` | `articles.html`, `article.html`?, `page.html` | `articles/…` |
//! | [`blog`] | `__blog/**/*.xml` | `tags.xml`, `blog.html`, `post.html` | `blog/…` |
//! | [`qa`] | `__qa/**/*.xml` | `qa.html` | `qa.html` |
//!
//! Loading and emitting are separate steps so records can be validated
//! without touching the destination (`sitemill check`). Every page is
//! written through the [`HashCache`], keyed by its destination path.
//!
//! A collection owns its output folder outright. After emitting, anything
//! under that folder it did not write this run (pages past the new last
//! page, categories that lost their posts, deleted articles) is removed.

pub mod articles;
pub mod blog;
pub mod date;
pub mod pagination;
pub mod qa;

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::{CacheError, CacheStats, HashCache};
use crate::diagnostics::Warning;
use crate::naming::output_slug;
use crate::sitemap::Sitemap;
use crate::template::{Renderer, TemplateError};
use crate::walk::Walk;

#[derive(Error, Debug)]
pub enum CollectionError {
    #[error("missing template {0}")]
    MissingTemplate(PathBuf),
    #[error("missing category list {0}")]
    MissingCategoryList(PathBuf),
    #[error("invalid record {path}: {reason}")]
    Record { path: PathBuf, reason: String },
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

impl CollectionError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        CollectionError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn record(path: &Path, reason: impl ToString) -> Self {
        CollectionError::Record {
            path: path.to_path_buf(),
            reason: reason.to_string(),
        }
    }
}

/// What one collection stage did.
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Records loaded from the source folder.
    pub records: usize,
    /// Pages rendered, split by cache decision.
    pub pages: CacheStats,
    /// Outputs from earlier builds that this one no longer produces.
    pub removed: Vec<PathBuf>,
    pub warnings: Vec<Warning>,
}

/// Deserialize one XML record file.
pub(crate) fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, CollectionError> {
    let raw = fs::read_to_string(path).map_err(|e| CollectionError::io(path, e))?;
    quick_xml::de::from_str(&raw).map_err(|e| CollectionError::record(path, e))
}

/// A template from the settings folder, read once and rendered many times.
#[derive(Debug, Clone)]
pub struct SettingsTemplate {
    name: String,
    source: String,
}

impl SettingsTemplate {
    /// Load `settings/name`, failing with [`CollectionError::MissingTemplate`]
    /// when it is absent.
    pub fn load(settings: &Path, name: &str) -> Result<Self, CollectionError> {
        Self::load_optional(settings, name)?
            .ok_or_else(|| CollectionError::MissingTemplate(settings.join(name)))
    }

    /// Load `settings/name` if it exists.
    pub fn load_optional(settings: &Path, name: &str) -> Result<Option<Self>, CollectionError> {
        let path = settings.join(name);
        match fs::read_to_string(&path) {
            Ok(source) => Ok(Some(Self {
                name: name.to_string(),
                source,
            })),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CollectionError::io(&path, e)),
        }
    }

    /// File name of the template, e.g. `blog.html`.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Shared sink for rendered collection pages.
pub struct Emitter<'a> {
    dest: &'a Path,
    renderer: &'a Renderer,
    cache: &'a HashCache,
    sitemap: &'a mut Sitemap,
    emitted: BTreeSet<PathBuf>,
    pub stats: CacheStats,
}

impl<'a> Emitter<'a> {
    pub fn new(
        dest: &'a Path,
        renderer: &'a Renderer,
        cache: &'a HashCache,
        sitemap: &'a mut Sitemap,
    ) -> Self {
        Self {
            dest,
            renderer,
            cache,
            sitemap,
            emitted: BTreeSet::new(),
            stats: CacheStats::default(),
        }
    }

    /// Render `template` into the destination-relative path `rel`.
    ///
    /// Parent directories are created as needed. When `url` is given it is
    /// appended to the sitemap, whether or not the file had to be rewritten.
    pub fn emit<C: Serialize>(
        &mut self,
        template: &SettingsTemplate,
        rel: &str,
        context: &C,
        url: Option<&str>,
    ) -> Result<(), CollectionError> {
        let html = self
            .renderer
            .render_str(&template.source, context, &template.name)?;

        let target = self.dest.join(rel);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| CollectionError::io(parent, e))?;
        }
        let outcome =
            self.cache
                .write_if_changed(&output_slug(rel), &target, html.as_bytes(), None)?;
        self.stats.record(outcome);
        self.emitted.insert(target);

        if let Some(url) = url {
            self.sitemap.push(url);
        }
        Ok(())
    }

    /// Hand the page counters back, resetting them for the next collection.
    pub fn take_stats(&mut self) -> CacheStats {
        std::mem::take(&mut self.stats)
    }

    /// Remove every file and folder under the destination folder `dir` that
    /// this emitter did not write.
    ///
    /// Deletion happens after the walk. Entries that cannot be removed become
    /// [`Warning::StaleOutputNotRemoved`]; everything else is returned.
    pub fn prune(
        &self,
        dir: &str,
        warnings: &mut Vec<Warning>,
    ) -> Result<Vec<PathBuf>, CollectionError> {
        let root = self.dest.join(dir);
        if !root.is_dir() {
            return Ok(Vec::new());
        }

        let mut live_dirs = BTreeSet::new();
        for path in &self.emitted {
            for ancestor in path.ancestors().skip(1) {
                if !ancestor.starts_with(&root) {
                    break;
                }
                live_dirs.insert(ancestor.to_path_buf());
            }
        }

        let mut stale = Vec::new();
        let mut walk = Walk::new(&root);
        while let Some(entry) = walk.next() {
            let entry = entry.map_err(|e| CollectionError::io(&root, e))?;
            if entry.is_dir {
                if !live_dirs.contains(&entry.path) {
                    walk.skip_subtree();
                    stale.push(entry);
                }
            } else if !self.emitted.contains(&entry.path) {
                stale.push(entry);
            }
        }

        let mut removed = Vec::new();
        for entry in stale {
            let result = if entry.is_dir {
                fs::remove_dir_all(&entry.path)
            } else {
                fs::remove_file(&entry.path)
            };
            match result {
                Ok(()) => {
                    tracing::debug!(path = %entry.path.display(), "removed stale output");
                    removed.push(entry.path);
                }
                Err(e) => {
                    let warning = Warning::StaleOutputNotRemoved {
                        path: entry.path,
                        reason: e.to_string(),
                    };
                    warning.log();
                    warnings.push(warning);
                }
            }
        }
        Ok(removed)
    }
}
