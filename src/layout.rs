//! Reserved folder names and the source/destination path bundle.
//!
//! A source tree mixes three kinds of entries:
//!
//! ```text
//! site/
//! ├── __settings/        # listing/detail templates, tags.xml, config.toml
//! ├── __templates/       # *.tmpl fragments shared by every page
//! ├── __articles/        # one XML per article (+ optional <slug>/N.html)
//! ├── __blog/            # blog post XML files, any depth
//! ├── __qa/              # Q&A XML files, any depth
//! ├── __hash/            # per-slug checksum cache (created on demand)
//! ├── _draft.html        # single underscore: ignored by the compiler
//! ├── assets/            # copied verbatim, never rendered
//! ├── index.html         # rendered through the template engine
//! └── docs/guide.php
//! ```
//!
//! Folders starting with [`RESERVED_DIR_PREFIX`] are inputs to the build and
//! never appear in the destination.

use std::path::{Path, PathBuf};

/// Directories with this prefix are consumed by the build, never mirrored.
pub const RESERVED_DIR_PREFIX: &str = "__";

/// Files and directories with this prefix are skipped by the compiler.
pub const RESERVED_ENTRY_PREFIX: char = '_';

pub const SETTINGS_DIR: &str = "__settings";
pub const TEMPLATES_DIR: &str = "__templates";
pub const ARTICLES_DIR: &str = "__articles";
pub const BLOG_DIR: &str = "__blog";
pub const QA_DIR: &str = "__qa";
pub const HASH_DIR: &str = "__hash";

/// Category list consumed by the blog stage.
pub const CATEGORY_LIST_FILE: &str = "tags.xml";

/// Output file name of page 1 of any listing.
pub const INDEX_FILE: &str = "index.html";

pub const SITEMAP_FILE: &str = "sitemap.xml";

/// Whether a directory name is reserved for build inputs.
pub fn is_reserved_dir(name: &str) -> bool {
    name.starts_with(RESERVED_DIR_PREFIX)
}

/// Whether a file or directory name is hidden from the compiler.
pub fn is_reserved_entry(name: &str) -> bool {
    name.starts_with(RESERVED_ENTRY_PREFIX)
}

/// Resolved paths of every reserved folder under a source root.
#[derive(Debug, Clone)]
pub struct SourceLayout {
    pub root: PathBuf,
    pub settings: PathBuf,
    pub templates: PathBuf,
    pub articles: PathBuf,
    pub blog: PathBuf,
    pub qa: PathBuf,
    pub hash: PathBuf,
}

impl SourceLayout {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            settings: root.join(SETTINGS_DIR),
            templates: root.join(TEMPLATES_DIR),
            articles: root.join(ARTICLES_DIR),
            blog: root.join(BLOG_DIR),
            qa: root.join(QA_DIR),
            hash: root.join(HASH_DIR),
        }
    }

    /// Path of a template inside the settings folder.
    pub fn settings_file(&self, name: &str) -> PathBuf {
        self.settings.join(name)
    }

    /// Fragment directory, or `None` when the site has no shared fragments.
    pub fn fragments(&self) -> Option<&Path> {
        self.templates.is_dir().then_some(self.templates.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reserved_dir_needs_double_prefix() {
        assert!(is_reserved_dir("__blog"));
        assert!(!is_reserved_dir("_drafts"));
        assert!(!is_reserved_dir("blog"));
    }

    #[test]
    fn reserved_entry_single_prefix() {
        assert!(is_reserved_entry("_partial.html"));
        assert!(is_reserved_entry("__settings"));
        assert!(!is_reserved_entry("index.html"));
    }

    #[test]
    fn layout_resolves_reserved_folders() {
        let layout = SourceLayout::new(Path::new("/site"));
        assert_eq!(layout.settings, Path::new("/site/__settings"));
        assert_eq!(layout.hash, Path::new("/site/__hash"));
        assert_eq!(
            layout.settings_file("blog.html"),
            Path::new("/site/__settings/blog.html")
        );
    }

    #[test]
    fn fragments_only_when_present() {
        let tmp = TempDir::new().unwrap();
        let layout = SourceLayout::new(tmp.path());
        assert!(layout.fragments().is_none());

        std::fs::create_dir(tmp.path().join(TEMPLATES_DIR)).unwrap();
        assert_eq!(layout.fragments(), Some(layout.templates.as_path()));
    }
}
