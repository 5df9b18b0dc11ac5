//! Questions and answers.
//!
//! Every `__qa/**/*.xml` record (`<date>`, `<name>`, `<question>`,
//! `<answer>`) ends up on a single `qa.html` at the destination root,
//! newest first. The page is not listed in the sitemap.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::date::{DateParts, parse_date};
use super::{CollectionError, CollectionReport, Emitter, SettingsTemplate, read_record};
use crate::walk::xml_files;

pub const TEMPLATE: &str = "qa.html";
/// Destination-relative path of the page.
pub const OUTPUT_FILE: &str = "qa.html";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Entry {
    pub date: String,
    pub name: String,
    pub question: String,
    pub answer: String,

    #[serde(skip_deserializing)]
    pub day: u32,
    #[serde(skip_deserializing)]
    pub month: String,
    #[serde(skip_deserializing)]
    pub year: i32,

    #[serde(skip)]
    pub sort_date: NaiveDate,
}

pub fn load(dir: &Path, month_names: &[String]) -> Result<Vec<Entry>, CollectionError> {
    let mut entries = Vec::new();
    for path in xml_files(dir, true).map_err(|e| CollectionError::io(dir, e))? {
        let mut entry: Entry = read_record(&path)?;
        entry.sort_date = parse_date(&entry.date).map_err(|e| {
            CollectionError::record(&path, format!("date {:?}: {e}", entry.date))
        })?;
        let parts = DateParts::new(entry.sort_date, month_names);
        entry.day = parts.day;
        entry.month = parts.month;
        entry.year = parts.year;
        entries.push(entry);
    }
    entries.sort_by(|a, b| b.sort_date.cmp(&a.sort_date));
    Ok(entries)
}

#[derive(Serialize)]
struct PageContext<'a> {
    slug: &'a str,
    qa: &'a [Entry],
    total: usize,
}

pub fn build(
    source: &Path,
    settings: &Path,
    month_names: &[String],
    out: &mut Emitter<'_>,
) -> Result<CollectionReport, CollectionError> {
    let template = SettingsTemplate::load(settings, TEMPLATE)?;
    let entries = load(source, month_names)?;

    out.emit(
        &template,
        OUTPUT_FILE,
        &PageContext {
            slug: template.name(),
            qa: &entries,
            total: entries.len(),
        },
        None,
    )?;

    tracing::info!(entries = entries.len(), "built Q&A");
    Ok(CollectionReport {
        records: entries.len(),
        pages: out.take_stats(),
        removed: Vec::new(),
        warnings: Vec::new(),
    })
}
