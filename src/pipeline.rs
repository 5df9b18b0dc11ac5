//! Build driver.
//!
//! Runs every stage in a fixed order over one source tree:
//!
//! ```text
//! 1. config     __settings/config.toml → SiteConfig
//! 2. sync       destination dirs ← source dirs
//! 3. articles   __articles/ → articles/         (if present)
//! 4. blog       __blog/     → blog/             (if present)
//! 5. qa         __qa/       → qa.html           (if present)
//! 6. compile    remaining source files → destination
//! 7. sitemap    → sitemap.xml
//! ```
//!
//! One [`Sitemap`] is lent to each stage in turn, so its entries follow this
//! order. The first fatal error stops the build and is returned with the
//! name of the stage that raised it. Output written before the failure
//! stays; the hash cache makes the next run cheap.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::cache::{CacheError, HashCache, WriteOutcome, write_if_different};
use crate::collections::articles::{self, Article};
use crate::collections::blog::{self, ActiveCategory, Post};
use crate::collections::qa;
use crate::collections::{CollectionError, CollectionReport, Emitter};
use crate::compile::{self, CompileError, CompileStats};
use crate::config::{self, ConfigError, SiteConfig};
use crate::diagnostics::Warning;
use crate::layout::{CATEGORY_LIST_FILE, SITEMAP_FILE, SourceLayout};
use crate::sitemap::Sitemap;
use crate::sync::{self, SyncError, SyncReport};
use crate::template::{Renderer, TemplateError};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("sync: {0}")]
    Sync(#[from] SyncError),
    #[error("templates: {0}")]
    Templates(#[from] TemplateError),
    #[error("articles: {0}")]
    Articles(#[source] CollectionError),
    #[error("blog: {0}")]
    Blog(#[source] CollectionError),
    #[error("qa: {0}")]
    Qa(#[source] CollectionError),
    #[error("compile: {0}")]
    Compile(#[from] CompileError),
    #[error("sitemap: {0}")]
    Sitemap(#[from] CacheError),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub source: PathBuf,
    pub destination: PathBuf,
    /// Site origin prefixed to sitemap entries, e.g. `https://example.com`.
    pub domain: String,
    /// Ignore cached checksums for this run.
    pub no_cache: bool,
}

/// Everything a build did, stage by stage.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub sync: SyncReport,
    pub articles: Option<CollectionReport>,
    pub blog: Option<CollectionReport>,
    pub qa: Option<CollectionReport>,
    pub compile: CompileStats,
    pub sitemap_entries: usize,
    pub sitemap_written: bool,
}

impl BuildReport {
    /// Recoverable conditions from every stage, in stage order.
    pub fn warnings(&self) -> impl Iterator<Item = &Warning> {
        let collections = [&self.articles, &self.blog, &self.qa]
            .into_iter()
            .flatten()
            .flat_map(|r| r.warnings.iter());
        self.sync
            .warnings
            .iter()
            .chain(collections)
            .chain(self.compile.warnings.iter())
    }
}

/// Top-level destination folders owned by the collections present in `layout`.
///
/// They have no source counterpart, so sync must not prune them.
pub fn generated_dirs(layout: &SourceLayout) -> Vec<&'static str> {
    let mut dirs = Vec::new();
    if layout.articles.is_dir() {
        dirs.push(articles::OUTPUT_DIR);
    }
    if layout.blog.is_dir() {
        dirs.push(blog::OUTPUT_DIR);
    }
    dirs
}

/// Destination names a build generates, which source files must not overwrite.
pub fn generated_outputs(layout: &SourceLayout) -> Vec<&'static str> {
    let mut names = generated_dirs(layout);
    if layout.qa.is_dir() {
        names.push(qa::OUTPUT_FILE);
    }
    names.push(SITEMAP_FILE);
    names
}

/// Align the destination's directories with the source's.
pub fn sync_tree(source: &Path, destination: &Path) -> Result<SyncReport, BuildError> {
    let layout = SourceLayout::new(source);
    Ok(sync::sync_with(
        source,
        destination,
        &generated_dirs(&layout),
    )?)
}

/// Run the full build.
pub fn build(options: &BuildOptions) -> Result<BuildReport, BuildError> {
    let layout = SourceLayout::new(&options.source);
    let dest = options.destination.as_path();
    let config = config::load_config(&layout.settings)?;

    let mut report = BuildReport {
        sync: sync_tree(&layout.root, dest)?,
        ..BuildReport::default()
    };
    tracing::info!(
        removed = report.sync.removed.len(),
        created = report.sync.created.len(),
        "synchronized directories"
    );

    let renderer = Renderer::new(layout.fragments(), &config.fragment_extension)?;
    let cache = HashCache::new(&layout.hash, options.no_cache);
    let mut sitemap = Sitemap::new(&options.domain);

    {
        let mut out = Emitter::new(dest, &renderer, &cache, &mut sitemap);
        if layout.articles.is_dir() {
            report.articles = Some(
                articles::build(&layout.articles, &layout.settings, &mut out)
                    .map_err(BuildError::Articles)?,
            );
        }
        if layout.blog.is_dir() {
            report.blog = Some(
                blog::build(&layout.blog, &layout.settings, &config, &mut out)
                    .map_err(BuildError::Blog)?,
            );
        }
        if layout.qa.is_dir() {
            report.qa = Some(
                qa::build(&layout.qa, &layout.settings, &config.month_names, &mut out)
                    .map_err(BuildError::Qa)?,
            );
        }
    }

    report.compile = compile::compile(
        &layout.root,
        dest,
        &renderer,
        &cache,
        &config,
        &generated_outputs(&layout),
        &mut sitemap,
    )?;

    report.sitemap_entries = sitemap.len();
    let outcome = write_if_different(&dest.join(SITEMAP_FILE), sitemap.finish().as_bytes())?;
    report.sitemap_written = outcome == WriteOutcome::Written;
    tracing::info!(entries = report.sitemap_entries, "wrote sitemap");

    Ok(report)
}

/// What `check` found in a source tree.
#[derive(Debug, Default)]
pub struct Inventory {
    pub config: SiteConfig,
    pub articles: Option<Vec<Article>>,
    pub posts: Option<Vec<Post>>,
    pub categories: Vec<ActiveCategory>,
    pub qa: Option<Vec<qa::Entry>>,
    pub warnings: Vec<Warning>,
}

/// Load and validate everything a build would read, without writing.
pub fn check(source: &Path) -> Result<Inventory, BuildError> {
    let layout = SourceLayout::new(source);
    let config = config::load_config(&layout.settings)?;
    Renderer::new(layout.fragments(), &config.fragment_extension)?;

    let mut inventory = Inventory::default();

    if layout.articles.is_dir() {
        let (loaded, warnings) = articles::load(&layout.articles).map_err(BuildError::Articles)?;
        inventory.articles = Some(loaded);
        inventory.warnings.extend(warnings);
    }

    if layout.blog.is_dir() {
        let categories = blog::load_categories(&layout.settings_file(CATEGORY_LIST_FILE))
            .map_err(BuildError::Blog)?;
        let (posts, counts) = blog::load_posts(&layout.blog, &categories, &config.month_names)
            .map_err(BuildError::Blog)?;
        inventory.categories = blog::active_categories(&categories, &counts);
        inventory.posts = Some(posts);
    }

    if layout.qa.is_dir() {
        inventory.qa = Some(qa::load(&layout.qa, &config.month_names).map_err(BuildError::Qa)?);
    }

    inventory.config = config;
    Ok(inventory)
}
