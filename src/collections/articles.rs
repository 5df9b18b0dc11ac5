//! Multi-page articles.
//!
//! ## Source
//!
//! ```text
//! __articles/
//! ├── rust-intro.xml          # <title>, <author>, <pages>Intro|Syntax|…</pages>
//! └── rust-intro/             # optional page bodies
//!     ├── 1.html
//!     └── 2.html
//! ```
//!
//! Only XML files directly in the folder are records. A page body that is
//! missing becomes empty content and a [`Warning`].
//!
//! ## Output
//!
//! ```text
//! articles/
//! ├── index.html              # listing of every article, sorted by title
//! └── rust-intro/
//!     ├── index.html          # contents page (article.html), if present
//!     ├── 1.html              # page 1 (index.html without a contents page)
//!     └── 2.html
//! ```
//!
//! Pages with empty content are not written; an article with no content
//! at all gets no folder. Anything else left in `articles/` by an earlier
//! build is removed.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use super::{CollectionError, CollectionReport, Emitter, SettingsTemplate, read_record};
use crate::diagnostics::Warning;
use crate::layout::INDEX_FILE;
use crate::naming::record_slug;
use crate::walk::xml_files;

/// Destination folder of the collection.
pub const OUTPUT_DIR: &str = "articles";

pub const LISTING_TEMPLATE: &str = "articles.html";
pub const CONTENTS_TEMPLATE: &str = "article.html";
pub const PAGE_TEMPLATE: &str = "page.html";

const PAGE_DELIMITER: char = '|';

/// One article record plus its page bodies.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Article {
    pub title: String,
    pub author: String,
    pub annotation: String,
    pub keywords: String,
    pub description: String,
    /// Page titles, `|`-delimited.
    pub pages: String,

    #[serde(skip_deserializing)]
    pub slug: String,
    #[serde(skip_deserializing)]
    pub page_titles: Vec<String>,
    /// Page bodies, parallel to `page_titles`.
    #[serde(skip_deserializing)]
    pub content: Vec<String>,
}

impl Article {
    pub fn has_content(&self) -> bool {
        self.content.iter().any(|c| !c.is_empty())
    }
}

/// Load every article in `dir`, sorted by title.
pub fn load(dir: &Path) -> Result<(Vec<Article>, Vec<Warning>), CollectionError> {
    let mut articles = Vec::new();
    let mut warnings = Vec::new();

    for path in xml_files(dir, false).map_err(|e| CollectionError::io(dir, e))? {
        let mut article: Article = read_record(&path)?;
        article.slug = record_slug(&path);
        article.page_titles = article
            .pages
            .split(PAGE_DELIMITER)
            .map(|t| t.trim().to_string())
            .collect();

        let page_dir = dir.join(&article.slug);
        article.content = if page_dir.is_dir() {
            read_pages(&article, &page_dir, &mut warnings)?
        } else {
            vec![String::new(); article.page_titles.len()]
        };
        articles.push(article);
    }

    articles.sort_by(|a, b| a.title.cmp(&b.title));
    Ok((articles, warnings))
}

fn read_pages(
    article: &Article,
    page_dir: &Path,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<String>, CollectionError> {
    let mut bodies = Vec::with_capacity(article.page_titles.len());
    for number in 1..=article.page_titles.len() {
        let path = page_dir.join(format!("{number}.html"));
        match fs::read_to_string(&path) {
            Ok(body) => bodies.push(body),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                let warning = Warning::MissingArticlePage {
                    article: article.slug.clone(),
                    page: number,
                    path,
                };
                warning.log();
                warnings.push(warning);
                bodies.push(String::new());
            }
            Err(e) => return Err(CollectionError::io(&path, e)),
        }
    }
    Ok(bodies)
}

#[derive(Serialize)]
struct ListingContext<'a> {
    slug: &'a str,
    articles: &'a [Article],
}

#[derive(Serialize)]
struct ContentsContext<'a> {
    slug: &'a str,
    title: &'a str,
    author: &'a str,
    annotation: &'a str,
    keywords: &'a str,
    description: &'a str,
    pages: &'a [String],
}

#[derive(Serialize)]
struct PageContext<'a> {
    slug: &'a str,
    title: &'a str,
    content: &'a str,
    keywords: &'a str,
    description: &'a str,
    this_title: &'a str,
    next_title: &'a str,
    next_address: String,
    prev_title: &'a str,
    prev_address: String,
    /// 0-based.
    pagenum: usize,
    pages_count: usize,
    pages_numbers: Vec<usize>,
}

/// Load the articles in `source` and render them into `articles/`.
pub fn build(
    source: &Path,
    settings: &Path,
    out: &mut Emitter<'_>,
) -> Result<CollectionReport, CollectionError> {
    let (articles, mut warnings) = load(source)?;
    let listing = SettingsTemplate::load(settings, LISTING_TEMPLATE)?;

    out.emit(
        &listing,
        &format!("{OUTPUT_DIR}/{INDEX_FILE}"),
        &ListingContext {
            slug: listing.name(),
            articles: &articles,
        },
        Some(&format!("/{OUTPUT_DIR}/")),
    )?;

    if articles.iter().any(Article::has_content) {
        let contents = SettingsTemplate::load_optional(settings, CONTENTS_TEMPLATE)?;
        let page = SettingsTemplate::load(settings, PAGE_TEMPLATE)?;
        for article in articles.iter().filter(|a| a.has_content()) {
            emit_article(article, contents.as_ref(), &page, out)?;
        }
    }

    let removed = out.prune(OUTPUT_DIR, &mut warnings)?;
    tracing::info!(
        articles = articles.len(),
        removed = removed.len(),
        "built articles"
    );
    Ok(CollectionReport {
        records: articles.len(),
        pages: out.take_stats(),
        removed,
        warnings,
    })
}

fn emit_article(
    article: &Article,
    contents: Option<&SettingsTemplate>,
    page: &SettingsTemplate,
    out: &mut Emitter<'_>,
) -> Result<(), CollectionError> {
    let dir = format!("{OUTPUT_DIR}/{}", article.slug);
    let url_dir = format!("/{dir}");

    if let Some(contents) = contents {
        out.emit(
            contents,
            &format!("{dir}/{INDEX_FILE}"),
            &ContentsContext {
                slug: contents.name(),
                title: &article.title,
                author: &article.author,
                annotation: &article.annotation,
                keywords: &article.keywords,
                description: &article.description,
                pages: &article.page_titles,
            },
            Some(&format!("{url_dir}/")),
        )?;
    }

    let count = article.page_titles.len();
    let file_name = |i: usize| -> String {
        match (i, contents) {
            (0, None) => INDEX_FILE.to_string(),
            _ => format!("{}.html", i + 1),
        }
    };

    for (i, body) in article.content.iter().enumerate() {
        if body.is_empty() {
            continue;
        }
        let is_last = i + 1 == count;
        let name = file_name(i);
        out.emit(
            page,
            &format!("{dir}/{name}"),
            &PageContext {
                slug: page.name(),
                title: &article.title,
                content: body,
                keywords: &article.keywords,
                description: &article.description,
                this_title: &article.page_titles[i],
                next_title: if is_last { "" } else { article.page_titles[i + 1].as_str() },
                next_address: if is_last { String::new() } else { file_name(i + 1) },
                prev_title: if i == 0 { "" } else { article.page_titles[i - 1].as_str() },
                prev_address: if i == 0 { String::new() } else { file_name(i - 1) },
                pagenum: i,
                pages_count: count,
                pages_numbers: (0..count).collect(),
            },
            Some(&format!("{url_dir}/{name}")),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::testing::Stage;
    use pretty_assertions::assert_eq;

    fn record(title: &str, pages: &str) -> String {
        format!(
            "<article><title>{title}</title><author>Ann</author>\
             <keywords>k</keywords><pages>{pages}</pages></article>"
        )
    }

    fn run(stage: &mut Stage) -> Result<CollectionReport, CollectionError> {
        let source = stage.src.path().join("__articles");
        let settings = stage.src.path().join("__settings");
        let mut out = stage.emitter();
        build(&source, &settings, &mut out)
    }

    fn with_templates(stage: &Stage, contents: bool) {
        stage.write(
            "__settings/articles.html",
            "{{ slug }}:{% for a in articles %}{{ a.title }};{% endfor %}",
        );
        stage.write(
            "__settings/page.html",
            "{{ this_title }}|{{ content }}|prev={{ prev_address }}|next={{ next_address }}|{{ pagenum }}/{{ pages_count }}",
        );
        if contents {
            stage.write(
                "__settings/article.html",
                "{{ title }} by {{ author }}: {{ pages|join(',') }}",
            );
        }
    }

    #[test]
    fn sorted_by_title_ascending() {
        let stage = Stage::new();
        stage.write("__articles/b.xml", &record("B", "one"));
        stage.write("__articles/a.xml", &record("A", "one"));
        stage.write("__articles/c.xml", &record("C", "one"));

        let (articles, _) = load(&stage.src.path().join("__articles")).unwrap();
        let titles: Vec<&str> = articles.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn nested_xml_is_not_a_record() {
        let stage = Stage::new();
        stage.write("__articles/a.xml", &record("A", "one"));
        stage.write("__articles/a/extra.xml", &record("Nested", "one"));

        let (articles, _) = load(&stage.src.path().join("__articles")).unwrap();
        assert_eq!(articles.len(), 1);
    }

    #[test]
    fn page_bodies_load_with_missing_as_warning() {
        let stage = Stage::new();
        stage.write("__articles/guide.xml", &record("Guide", "Intro|Middle|End"));
        stage.write("__articles/guide/1.html", "<p>intro</p>");
        stage.write("__articles/guide/3.html", "<p>end</p>");

        let (articles, warnings) = load(&stage.src.path().join("__articles")).unwrap();
        let guide = &articles[0];
        assert_eq!(guide.slug, "guide");
        assert_eq!(guide.page_titles, vec!["Intro", "Middle", "End"]);
        assert_eq!(guide.content, vec!["<p>intro</p>", "", "<p>end</p>"]);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::MissingArticlePage { page: 2, .. }
        ));
    }

    #[test]
    fn article_without_folder_has_empty_content() {
        let stage = Stage::new();
        stage.write("__articles/solo.xml", &record("Solo", "One|Two"));

        let (articles, warnings) = load(&stage.src.path().join("__articles")).unwrap();
        assert_eq!(articles[0].content, vec!["", ""]);
        assert!(!articles[0].has_content());
        assert!(warnings.is_empty());
    }

    #[test]
    fn listing_only_when_no_article_has_content() {
        let mut stage = Stage::new();
        with_templates(&stage, false);
        stage.write("__articles/solo.xml", &record("Solo", "One"));

        let report = run(&mut stage).unwrap();
        assert_eq!(stage.read("articles/index.html"), "articles.html:Solo;");
        assert!(!stage.exists("articles/solo"));
        assert_eq!(report.records, 1);
        assert_eq!(stage.locs(), vec!["https://example.com/articles/"]);
    }

    #[test]
    fn pages_without_contents_template_start_at_index() {
        let mut stage = Stage::new();
        with_templates(&stage, false);
        stage.write("__articles/guide.xml", &record("Guide", "Intro|Middle|End"));
        stage.write("__articles/guide/1.html", "i");
        stage.write("__articles/guide/2.html", "m");
        stage.write("__articles/guide/3.html", "e");

        run(&mut stage).unwrap();
        assert_eq!(
            stage.read("articles/guide/index.html"),
            "Intro|i|prev=|next=2.html|0/3"
        );
        assert_eq!(
            stage.read("articles/guide/2.html"),
            "Middle|m|prev=index.html|next=3.html|1/3"
        );
        assert_eq!(
            stage.read("articles/guide/3.html"),
            "End|e|prev=2.html|next=|2/3"
        );
        assert_eq!(
            stage.locs(),
            vec![
                "https://example.com/articles/",
                "https://example.com/articles/guide/index.html",
                "https://example.com/articles/guide/2.html",
                "https://example.com/articles/guide/3.html",
            ]
        );
    }

    #[test]
    fn contents_template_moves_first_page_to_one() {
        let mut stage = Stage::new();
        with_templates(&stage, true);
        stage.write("__articles/guide.xml", &record("Guide", "Intro|End"));
        stage.write("__articles/guide/1.html", "i");
        stage.write("__articles/guide/2.html", "e");

        run(&mut stage).unwrap();
        assert_eq!(
            stage.read("articles/guide/index.html"),
            "Guide by Ann: Intro,End"
        );
        assert_eq!(
            stage.read("articles/guide/1.html"),
            "Intro|i|prev=|next=2.html|0/2"
        );
        assert_eq!(
            stage.read("articles/guide/2.html"),
            "End|e|prev=1.html|next=|1/2"
        );
        assert_eq!(stage.locs()[1], "https://example.com/articles/guide/");
    }

    #[test]
    fn empty_pages_are_skipped() {
        let mut stage = Stage::new();
        with_templates(&stage, false);
        stage.write("__articles/guide.xml", &record("Guide", "Intro|Gap|End"));
        stage.write("__articles/guide/1.html", "i");
        stage.write("__articles/guide/3.html", "e");

        let report = run(&mut stage).unwrap();
        assert!(!stage.exists("articles/guide/2.html"));
        assert!(stage.exists("articles/guide/3.html"));
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn deleted_article_loses_its_folder() {
        let mut stage = Stage::new();
        with_templates(&stage, false);
        stage.write("__articles/guide.xml", &record("Guide", "Intro"));
        stage.write("__articles/guide/1.html", "i");
        stage.write("__articles/other.xml", &record("Other", "Only"));
        stage.write("__articles/other/1.html", "o");
        run(&mut stage).unwrap();
        assert!(stage.exists("articles/guide/index.html"));

        std::fs::remove_file(stage.src.path().join("__articles/guide.xml")).unwrap();
        let report = run(&mut stage).unwrap();

        assert!(!stage.exists("articles/guide"));
        assert!(stage.exists("articles/other/index.html"));
        assert_eq!(report.removed, vec![stage.dst.path().join("articles/guide")]);
    }

    #[test]
    fn missing_listing_template_fails() {
        let mut stage = Stage::new();
        stage.write("__articles/a.xml", &record("A", "one"));
        assert!(matches!(
            run(&mut stage),
            Err(CollectionError::MissingTemplate(_))
        ));
    }

    #[test]
    fn missing_page_template_fails_when_content_exists() {
        let mut stage = Stage::new();
        stage.write("__settings/articles.html", "list");
        stage.write("__articles/a.xml", &record("A", "one"));
        stage.write("__articles/a/1.html", "body");
        match run(&mut stage) {
            Err(CollectionError::MissingTemplate(path)) => {
                assert!(path.ends_with("page.html"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
