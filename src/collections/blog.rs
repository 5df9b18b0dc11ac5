//! Blog posts grouped by category.
//!
//! ## Source
//!
//! ```text
//! __settings/tags.xml         # <tags><tag id="1" name="News"><epigraph>…</epigraph></tag>…</tags>
//! __blog/
//! ├── 2021/
//! │   └── hello-world.xml     # <date>15.06.2021</date> <tagid>1</tagid> <title>…
//! └── older.xml
//! ```
//!
//! Posts are found recursively. `tagid` is the 1-based position of the
//! post's category in `tags.xml`.
//!
//! ## Output
//!
//! ```text
//! blog/
//! ├── index.html, 2.html, …   # every post, newest first
//! ├── <category id>/          # one listing per category that has posts
//! │   └── index.html, 2.html, …
//! └── posts/
//!     └── hello-world.html    # one page per post
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::date::{DateParts, parse_date};
use super::pagination::paginate;
use super::{CollectionError, CollectionReport, Emitter, SettingsTemplate, read_record};
use crate::config::SiteConfig;
use crate::layout::CATEGORY_LIST_FILE;
use crate::naming::record_slug;
use crate::walk::xml_files;

/// Destination folder of the collection.
pub const OUTPUT_DIR: &str = "blog";
/// Folder of the per-post pages inside [`OUTPUT_DIR`].
pub const POSTS_DIR: &str = "posts";

pub const LISTING_TEMPLATE: &str = "blog.html";
pub const POST_TEMPLATE: &str = "post.html";

/// A blog category from the category list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    #[serde(rename = "@id")]
    pub id: u32,
    #[serde(rename = "@name")]
    pub name: String,
    #[serde(default)]
    pub epigraph: String,
}

#[derive(Deserialize)]
struct CategoryList {
    #[serde(rename = "tag", default)]
    tags: Vec<Category>,
}

/// Post counts keyed by category id.
pub type CategoryCounts = BTreeMap<u32, usize>;

/// A category as templates see it: only categories with posts are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActiveCategory {
    pub id: u32,
    pub name: String,
    pub epigraph: String,
    pub posts: usize,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Post {
    pub date: String,
    pub author: String,
    pub tagid: u32,
    pub title: String,
    pub sites: String,
    pub annotation: String,
    pub short_annotation: String,
    pub content: String,

    #[serde(skip_deserializing)]
    pub slug: String,
    /// Category display name.
    #[serde(skip_deserializing)]
    pub tag: String,
    #[serde(skip_deserializing)]
    pub day: u32,
    #[serde(skip_deserializing)]
    pub month: String,
    #[serde(skip_deserializing)]
    pub year: i32,

    #[serde(skip)]
    pub sort_date: NaiveDate,
    /// Index of the category in the category list.
    #[serde(skip)]
    pub category: usize,
}

/// Load the category list, which must exist.
pub fn load_categories(path: &Path) -> Result<Vec<Category>, CollectionError> {
    if !path.is_file() {
        return Err(CollectionError::MissingCategoryList(path.to_path_buf()));
    }
    let list: CategoryList = read_record(path)?;
    Ok(list.tags)
}

/// Load every post below `dir`, newest first, with per-category counts.
///
/// Posts with the same date keep their file-name order.
pub fn load_posts(
    dir: &Path,
    categories: &[Category],
    month_names: &[String],
) -> Result<(Vec<Post>, CategoryCounts), CollectionError> {
    let mut posts = Vec::new();
    let mut counts = CategoryCounts::new();

    for path in xml_files(dir, true).map_err(|e| CollectionError::io(dir, e))? {
        let mut post: Post = read_record(&path)?;

        let index = (post.tagid as usize)
            .checked_sub(1)
            .filter(|i| *i < categories.len())
            .ok_or_else(|| {
                CollectionError::record(
                    &path,
                    format!(
                        "tagid {} is outside the category list (1..={})",
                        post.tagid,
                        categories.len()
                    ),
                )
            })?;
        let category = &categories[index];
        *counts.entry(category.id).or_default() += 1;

        post.sort_date = parse_date(&post.date).map_err(|e| {
            CollectionError::record(&path, format!("date {:?}: {e}", post.date))
        })?;
        let parts = DateParts::new(post.sort_date, month_names);
        post.day = parts.day;
        post.month = parts.month;
        post.year = parts.year;
        post.slug = record_slug(&path);
        post.tag = category.name.clone();
        post.category = index;
        posts.push(post);
    }

    posts.sort_by(|a, b| b.sort_date.cmp(&a.sort_date));
    Ok((posts, counts))
}

/// Categories referenced by at least one post, in list order.
pub fn active_categories(categories: &[Category], counts: &CategoryCounts) -> Vec<ActiveCategory> {
    categories
        .iter()
        .filter_map(|c| {
            let posts = counts.get(&c.id).copied().unwrap_or(0);
            (posts > 0).then(|| ActiveCategory {
                id: c.id,
                name: c.name.clone(),
                epigraph: c.epigraph.clone(),
                posts,
            })
        })
        .collect()
}

#[derive(Serialize)]
struct ListingContext<'a> {
    slug: &'a str,
    tags: &'a [ActiveCategory],
    blog: &'a [&'a Post],
    /// 1-based.
    pagenum: usize,
    next_page: bool,
    pages_count: usize,
    total: usize,
    /// 0 for the unfiltered listing.
    tagid: u32,
    posts_per_page: usize,
}

#[derive(Serialize)]
struct PostContext<'a> {
    slug: &'a str,
    tags: &'a [ActiveCategory],
    blogpost: &'a Post,
    total: usize,
}

/// Load the blog and render listings and post pages into `blog/`.
pub fn build(
    source: &Path,
    settings: &Path,
    config: &SiteConfig,
    out: &mut Emitter<'_>,
) -> Result<CollectionReport, CollectionError> {
    let categories = load_categories(&settings.join(CATEGORY_LIST_FILE))?;
    let listing = SettingsTemplate::load(settings, LISTING_TEMPLATE)?;
    let post_page = SettingsTemplate::load(settings, POST_TEMPLATE)?;

    let (posts, counts) = load_posts(source, &categories, &config.month_names)?;
    let active = active_categories(&categories, &counts);
    let total = posts.len();

    let all: Vec<&Post> = posts.iter().collect();
    emit_listing(&listing, OUTPUT_DIR, 0, &all, &active, total, config, out)?;

    for category in &active {
        let filtered: Vec<&Post> = posts
            .iter()
            .filter(|p| categories[p.category].id == category.id)
            .collect();
        let dir = format!("{OUTPUT_DIR}/{}", category.id);
        emit_listing(&listing, &dir, category.id, &filtered, &active, total, config, out)?;
    }

    for post in &posts {
        let rel = format!("{OUTPUT_DIR}/{POSTS_DIR}/{}.html", post.slug);
        out.emit(
            &post_page,
            &rel,
            &PostContext {
                slug: post_page.name(),
                tags: &active,
                blogpost: post,
                total,
            },
            Some(&format!("/{rel}")),
        )?;
    }

    let mut warnings = Vec::new();
    let removed = out.prune(OUTPUT_DIR, &mut warnings)?;
    tracing::info!(
        posts = total,
        categories = active.len(),
        removed = removed.len(),
        "built blog"
    );
    Ok(CollectionReport {
        records: total,
        pages: out.take_stats(),
        removed,
        warnings,
    })
}

#[allow(clippy::too_many_arguments)]
fn emit_listing(
    template: &SettingsTemplate,
    dir: &str,
    tagid: u32,
    posts: &[&Post],
    active: &[ActiveCategory],
    total: usize,
    config: &SiteConfig,
    out: &mut Emitter<'_>,
) -> Result<(), CollectionError> {
    let url_dir = format!("/{dir}");
    for page in paginate(posts, config.posts_per_page) {
        out.emit(
            template,
            &page.output_path(dir),
            &ListingContext {
                slug: template.name(),
                tags: active,
                blog: page.items,
                pagenum: page.number,
                next_page: !page.is_last(),
                pages_count: page.count,
                total,
                tagid,
                posts_per_page: config.posts_per_page,
            },
            Some(&page.url(&url_dir)),
        )?;
    }
    Ok(())
}
