//! Slug derivation.
//!
//! A slug identifies a generated page. It names the page's cache entry and
//! is handed to templates as `slug`. Two conventions are used:
//!
//! - **Path slugs** for compiled pages and collection outputs: the path
//!   relative to its root with separators replaced by [`SLUG_JOIN`].
//!   - `index.html` → `index.html`
//!   - `docs/guide.php` → `docs-guide.php`
//!   - `blog/posts/hello.html` → `blog-posts-hello.html`
//! - **Record slugs** for XML content: the file name without extension.
//!   - `__blog/2021/hello-world.xml` → `hello-world`

use std::path::{Component, Path};

/// Character that replaces path separators in path slugs.
pub const SLUG_JOIN: char = '-';

/// Build a path slug from a relative path.
pub fn path_slug(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    parts.join(&SLUG_JOIN.to_string())
}

/// Build a path slug from `/`-separated output segments.
pub fn output_slug(rel: &str) -> String {
    rel.trim_matches('/').replace('/', &SLUG_JOIN.to_string())
}

/// Record slug: file name without its extension.
pub fn record_slug(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// First normal component of a relative path.
pub fn top_segment(rel: &Path) -> Option<String> {
    rel.components().find_map(|c| match c {
        Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
        _ => None,
    })
}

/// Whether a page slug names the site's not-found page.
///
/// Only the extension is ignored: `404.html` matches `404`, while
/// `errors-404.html` does not.
pub fn is_not_found(slug: &str, not_found: &str) -> bool {
    let stem = match slug.rfind('.') {
        Some(dot) if dot > 0 => &slug[..dot],
        _ => slug,
    };
    stem == not_found
}

/// Relative URL path of a file under a root, always `/`-separated.
pub fn url_path(rel: &Path) -> String {
    let parts: Vec<String> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    format!("/{}", parts.join("/"))
}
