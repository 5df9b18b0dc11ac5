//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Output describes content, not files. Records are listed by positional
//! index and title; source paths appear as indented `Source:` context lines.
//! Stage summaries lead with what was produced, then how much of it the
//! cache saved.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Sync
//!     1 created, 0 removed
//! Articles (2 records)
//!     pages: 4 written
//! Blog (25 records)
//!     pages: 0 written, 32 unchanged (32 total)
//! Compile
//!     pages: 3 written; files: 2 copied
//! Sitemap
//!     38 entries, unchanged
//! ```
//!
//! ## Check
//!
//! ```text
//! Articles
//! 001 Getting Started (3 pages)
//!     Source: getting-started.xml
//!
//! Blog (12 posts)
//! 001 News (8 posts)
//! 002 Notes (4 posts)
//!
//! Q&A (5 entries)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::collections::CollectionReport;
use crate::diagnostics::Warning;
use crate::pipeline::{BuildReport, Inventory};
use crate::sync::SyncReport;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Pluralize a count: `1 page`, `3 pages`.
fn count(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

fn sync_line(report: &SyncReport) -> String {
    format!(
        "{}{} created, {} removed",
        indent(1),
        report.created.len(),
        report.removed.len()
    )
}

fn collection_lines(title: &str, report: &CollectionReport) -> Vec<String> {
    let mut lines = vec![
        format!("{} ({})", title, count(report.records, "record", "records")),
        format!("{}pages: {}", indent(1), report.pages),
    ];
    if !report.removed.is_empty() {
        lines.push(format!(
            "{}stale: {} removed",
            indent(1),
            report.removed.len()
        ));
    }
    lines
}

fn warning_lines(warnings: &[&Warning]) -> Vec<String> {
    if warnings.is_empty() {
        return Vec::new();
    }
    let mut lines = vec![format!("Warnings ({})", warnings.len())];
    lines.extend(warnings.iter().map(|w| format!("{}{}", indent(1), w)));
    lines
}

// ============================================================================
// Sync
// ============================================================================

pub fn format_sync_output(report: &SyncReport) -> Vec<String> {
    let mut lines = vec!["Sync".to_string(), sync_line(report)];
    let warnings: Vec<&Warning> = report.warnings.iter().collect();
    lines.extend(warning_lines(&warnings));
    lines
}

pub fn print_sync_output(report: &SyncReport) {
    for line in format_sync_output(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec!["Sync".to_string(), sync_line(&report.sync)];

    let collections = [
        ("Articles", &report.articles),
        ("Blog", &report.blog),
        ("Q&A", &report.qa),
    ];
    for (title, stage) in collections {
        if let Some(stage) = stage {
            lines.extend(collection_lines(title, stage));
        }
    }

    lines.push("Compile".to_string());
    lines.push(format!("{}{}", indent(1), report.compile));

    lines.push("Sitemap".to_string());
    lines.push(format!(
        "{}{}, {}",
        indent(1),
        count(report.sitemap_entries, "entry", "entries"),
        if report.sitemap_written {
            "written"
        } else {
            "unchanged"
        }
    ));

    let warnings: Vec<&Warning> = report.warnings().collect();
    lines.extend(warning_lines(&warnings));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

pub fn format_check_output(inventory: &Inventory) -> Vec<String> {
    let mut lines = Vec::new();

    if let Some(articles) = &inventory.articles {
        lines.push("Articles".to_string());
        for (i, article) in articles.iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                article.title,
                count(article.page_titles.len(), "page", "pages")
            ));
            lines.push(format!("{}Source: {}.xml", indent(1), article.slug));
        }
        lines.push(String::new());
    }

    if let Some(posts) = &inventory.posts {
        lines.push(format!("Blog ({})", count(posts.len(), "post", "posts")));
        for (i, category) in inventory.categories.iter().enumerate() {
            lines.push(format!(
                "{} {} ({})",
                format_index(i + 1),
                category.name,
                count(category.posts, "post", "posts")
            ));
        }
        lines.push(String::new());
    }

    if let Some(entries) = &inventory.qa {
        lines.push(format!("Q&A ({})", count(entries.len(), "entry", "entries")));
        lines.push(String::new());
    }

    lines.push("Config".to_string());
    lines.push(format!(
        "{}posts_per_page: {}",
        indent(1),
        inventory.config.posts_per_page
    ));
    lines.push(format!(
        "{}page_extensions: {}",
        indent(1),
        inventory.config.page_extensions.join(", ")
    ));

    let warnings: Vec<&Warning> = inventory.warnings.iter().collect();
    lines.extend(warning_lines(&warnings));
    lines
}

pub fn print_check_output(inventory: &Inventory) {
    for line in format_check_output(inventory) {
        println!("{}", line);
    }
}
