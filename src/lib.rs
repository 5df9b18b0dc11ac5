//! # Sitemill
//!
//! A static site compiler for template-driven sites with XML-backed content.
//! The source tree is the site: every folder is mirrored, every page is
//! rendered through the template engine, and reserved `__` folders hold the
//! settings, shared fragments and structured records (articles, blog posts,
//! Q&A entries) that become generated listing pages.
//!
//! # Architecture: One Pass, Fixed Stage Order
//!
//! ```text
//! 1. Sync         source dirs  →  destination dirs   (prune stale, create missing)
//! 2. Collections  __articles/, __blog/, __qa/  →  articles/, blog/, qa.html
//! 3. Compile      every other source file  →  destination (render or copy)
//! 4. Sitemap      entries from 2 and 3  →  sitemap.xml
//! ```
//!
//! Every stage is deterministic: walks are sorted by file name, records are
//! sorted with stable sorts, and the sitemap keeps emission order. Running a
//! build twice on unchanged input rewrites nothing.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`pipeline`] | Build driver: runs the stages in order, wraps errors with the stage name |
//! | [`sync`] | Directory synchronizer: mirrors the source folder structure |
//! | [`collections`] | Article, blog and Q&A loaders and page emitters |
//! | [`compile`] | Incremental compiler: renders pages, copies everything else |
//! | [`template`] | Template rendering with shared fragments and helper functions |
//! | [`sitemap`] | Sitemap accumulator shared by every emitting stage |
//! | [`cache`] | Per-slug CRC-32 cache that skips unchanged writes |
//! | [`walk`] | Sorted depth-first traversal with subtree skipping |
//! | [`naming`] | Slug derivation from paths and record file names |
//! | [`layout`] | Reserved folder names and source layout paths |
//! | [`config`] | Optional `__settings/config.toml` over stock defaults |
//! | [`diagnostics`] | Recoverable warnings collected in stage reports |
//! | [`output`] | CLI output formatting of stage reports |
//!
//! # Design Decisions
//!
//! ## Content Hashes, Not Timestamps
//!
//! A page's output depends on its template, every shared fragment and (for
//! listings) many records, so source mtimes cannot tell whether it changed.
//! Each page is rendered every run and its CRC-32 compared with the one
//! stored for its slug under `__hash/`. Unchanged pages are not written and
//! keep their mtime, so deploy tools that sync by timestamp upload only what
//! actually changed.
//!
//! ## Cache in the Source Tree
//!
//! `__hash/` lives next to the content, not in the output. The destination
//! can be wiped or re-cloned; a missing output file is always rewritten
//! regardless of what the cache says.
//!
//! ## Reserved Prefixes
//!
//! Folders starting with `__` are never mirrored or compiled. Files and
//! folders starting with a single `_` are left out of compilation, which
//! keeps drafts and partials next to the pages that use them.

pub mod cache;
pub mod collections;
pub mod compile;
pub mod config;
pub mod diagnostics;
pub mod layout;
pub mod naming;
pub mod output;
pub mod pipeline;
pub mod sitemap;
pub mod sync;
pub mod template;
pub mod walk;

#[cfg(test)]
pub(crate) mod test_helpers;
