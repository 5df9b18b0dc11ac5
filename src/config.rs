//! Site configuration module.
//!
//! Handles loading, merging and validating the optional `config.toml` that
//! lives in the settings folder. Stock defaults cover every key; a user file
//! only needs the values it wants to change.
//!
//! ## Config File Location
//!
//! ```text
//! site/
//! └── __settings/
//!     ├── config.toml          # optional, overrides stock defaults
//!     ├── tags.xml
//!     └── blog.html …
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! posts_per_page = 10                 # blog posts per listing page
//! page_extensions = ["html", "php"]   # files rendered through templates
//! fragment_extension = "tmpl"         # shared fragments in __templates/
//! assets_dir = "assets"               # top-level folder copied verbatim
//! not_found_page = "404"              # page left out of the sitemap
//! month_names = ["Января", …]         # 12 names used for post dates
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file inside the settings folder.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Russian month names in the genitive case, as used in "3 Марта 2020".
pub const RUSSIAN_MONTHS: [&str; 12] = [
    "Января", "Февраля", "Марта", "Апреля", "Мая", "Июня", "Июля", "Августа", "Сентября",
    "Октября", "Ноября", "Декабря",
];

/// Site configuration loaded from `__settings/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Blog posts per listing page.
    pub posts_per_page: usize,
    /// Extensions (without dot) of files rendered through the template engine.
    pub page_extensions: Vec<String>,
    /// Extension of shared fragments in the templates folder.
    pub fragment_extension: String,
    /// Top-level source folder whose files are always copied, never rendered.
    pub assets_dir: String,
    /// File stem of the not-found page, which is kept out of the sitemap.
    pub not_found_page: String,
    /// Localized month names, January first.
    pub month_names: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_per_page: 10,
            page_extensions: vec!["html".into(), "php".into()],
            fragment_extension: "tmpl".into(),
            assets_dir: "assets".into(),
            not_found_page: "404".into(),
            month_names: RUSSIAN_MONTHS.iter().map(|m| m.to_string()).collect(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.posts_per_page == 0 {
            return Err(ConfigError::Validation(
                "posts_per_page must be at least 1".into(),
            ));
        }
        if self.page_extensions.is_empty() {
            return Err(ConfigError::Validation(
                "page_extensions must not be empty".into(),
            ));
        }
        let dotted = self
            .page_extensions
            .iter()
            .chain(std::iter::once(&self.fragment_extension))
            .find(|ext| ext.is_empty() || ext.starts_with('.'));
        if let Some(ext) = dotted {
            return Err(ConfigError::Validation(format!(
                "extension {ext:?} must be non-empty and given without a leading dot"
            )));
        }
        if self.month_names.len() != 12 {
            return Err(ConfigError::Validation(format!(
                "month_names must list 12 months, found {}",
                self.month_names.len()
            )));
        }
        Ok(())
    }

    /// Whether a file with this extension is rendered as a page.
    pub fn is_page_extension(&self, ext: &str) -> bool {
        self.page_extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the settings folder, falling back to stock defaults.
pub fn load_config(settings_dir: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(settings_dir)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sitemill configuration
# ======================
# Place this file at <source>/__settings/config.toml.
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Number of blog posts on each listing page (blog/index.html, blog/2.html, ...
# and the same for every category folder). Must be at least 1.
posts_per_page = 10

# Files with these extensions are rendered through the template engine.
# Every other file is copied byte-for-byte. Give extensions without a dot.
page_extensions = ["html", "php"]

# Shared template fragments are loaded from __templates/*.<fragment_extension>
# and can be included by name, e.g. {% include "header.tmpl" %}.
fragment_extension = "tmpl"

# Files below this top-level folder are always copied, never rendered,
# even when their extension is a page extension.
assets_dir = "assets"

# File stem of the not-found page. It is rendered like any other page but
# left out of sitemap.xml.
not_found_page = "404"

# Month names used for the `month` field of blog posts and Q&A entries,
# January first. Exactly 12 entries.
month_names = [
    "Января", "Февраля", "Марта", "Апреля", "Мая", "Июня",
    "Июля", "Августа", "Сентября", "Октября", "Ноября", "Декабря",
]
"##
}
