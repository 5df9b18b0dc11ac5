//! Template rendering.
//!
//! Pages are rendered with [minijinja](https://docs.rs/minijinja). Before a
//! page is parsed, every fragment in the site's `__templates/` folder
//! (`*.tmpl` by default) is registered under its file name, so any page can
//! pull shared pieces in with `{% include "header.tmpl" %}`, `{% extends
//! "base.tmpl" %}` or `{% from "macros.tmpl" import card %}`.
//!
//! Output is plain text: no HTML auto-escaping is applied, because record
//! bodies and article pages carry ready-made markup. Trailing newlines are
//! kept so a rendered file is byte-for-byte what the template produces.
//!
//! ## Functions
//!
//! | Name | Example | Result |
//! |------|---------|--------|
//! | `inc(n)` | `{{ inc(pagenum) }}` | `n + 1` |
//! | `dec(n)` | `{{ dec(pagenum) }}` | `n - 1` |
//! | `first(s)` | `{{ first(title) }}` | first character, `""` for empty input |
//!
//! `inc` and `dec` are also registered as filters (`{{ pagenum|inc }}`).
//! Stepping past the range of a 64-bit integer is a render error.

use minijinja::{AutoEscape, Environment, ErrorKind};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("cannot read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid fragment pattern: {0}")]
    Pattern(#[from] glob::PatternError),
    #[error("cannot list fragments: {0}")]
    Glob(#[from] glob::GlobError),
    #[error("template {name}: {source}")]
    Render {
        name: String,
        #[source]
        source: minijinja::Error,
    },
}

/// Template environment with the site's fragments preloaded.
#[derive(Clone)]
pub struct Renderer {
    env: Environment<'static>,
}

impl Renderer {
    /// Build a renderer, loading `*.<fragment_extension>` files from
    /// `fragments` when given.
    pub fn new(fragments: Option<&Path>, fragment_extension: &str) -> Result<Self, TemplateError> {
        let mut env = base_environment();
        if let Some(dir) = fragments {
            for path in fragment_files(dir, fragment_extension)? {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let source = read(&path)?;
                env.add_template_owned(name.clone(), source)
                    .map_err(|e| TemplateError::Render { name, source: e })?;
            }
        }
        Ok(Self { env })
    }

    /// Render `template` with `context`, registering it as `name`.
    pub fn render<C: Serialize>(
        &self,
        template: &Path,
        context: &C,
        name: &str,
    ) -> Result<String, TemplateError> {
        let source = read(template)?;
        self.render_str(&source, context, name)
    }

    /// Render template text that is already in memory.
    pub fn render_str<C: Serialize>(
        &self,
        source: &str,
        context: &C,
        name: &str,
    ) -> Result<String, TemplateError> {
        let wrap = |e: minijinja::Error| TemplateError::Render {
            name: name.to_string(),
            source: e,
        };
        let mut env = self.env.clone();
        env.add_template_owned(name.to_string(), source.to_string())
            .map_err(wrap)?;
        let template = env.get_template(name).map_err(wrap)?;
        template.render(context).map_err(wrap)
    }
}

/// Render a single template file in one call.
pub fn render<C: Serialize>(
    template: &Path,
    fragments: Option<&Path>,
    fragment_extension: &str,
    context: &C,
    name: &str,
) -> Result<String, TemplateError> {
    Renderer::new(fragments, fragment_extension)?.render(template, context, name)
}

fn base_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_keep_trailing_newline(true);
    env.add_function("inc", inc);
    env.add_function("dec", dec);
    env.add_function("first", first);
    env.add_filter("inc", inc);
    env.add_filter("dec", dec);
    env
}

fn inc(n: i64) -> Result<i64, minijinja::Error> {
    n.checked_add(1).ok_or_else(|| overflow("inc", n))
}

fn dec(n: i64) -> Result<i64, minijinja::Error> {
    n.checked_sub(1).ok_or_else(|| overflow("dec", n))
}

fn overflow(name: &str, n: i64) -> minijinja::Error {
    minijinja::Error::new(
        ErrorKind::InvalidOperation,
        format!("{name}({n}) is out of integer range"),
    )
}

fn first(s: String) -> String {
    s.chars().next().map(String::from).unwrap_or_default()
}

fn fragment_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>, TemplateError> {
    let pattern = format!(
        "{}/*.{}",
        glob::Pattern::escape(&dir.to_string_lossy()),
        extension
    );
    let mut files = Vec::new();
    for entry in glob::glob(&pattern)? {
        files.push(entry?);
    }
    files.sort();
    Ok(files)
}

fn read(path: &Path) -> Result<String, TemplateError> {
    fs::read_to_string(path).map_err(|e| TemplateError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;
    use tempfile::TempDir;

    #[derive(Serialize)]
    struct Ctx<'a> {
        slug: &'a str,
        title: &'a str,
        pagenum: i64,
    }

    fn ctx() -> Ctx<'static> {
        Ctx {
            slug: "index.html",
            title: "Ёлка",
            pagenum: 2,
        }
    }

    fn plain() -> Renderer {
        Renderer::new(None, "tmpl").unwrap()
    }

    #[test]
    fn renders_bound_fields() {
        let out = plain()
            .render_str("{{ slug }}: {{ title }}", &ctx(), "t.html")
            .unwrap();
        assert_eq!(out, "index.html: Ёлка");
    }

    #[test]
    fn inc_dec_functions_and_filters() {
        let out = plain()
            .render_str(
                "{{ inc(pagenum) }} {{ dec(pagenum) }} {{ pagenum|inc }}",
                &ctx(),
                "t",
            )
            .unwrap();
        assert_eq!(out, "3 1 3");
    }

    #[test]
    fn inc_dec_at_integer_limits_fail_to_render() {
        for (text, pagenum) in [
            ("{{ inc(pagenum) }}", i64::MAX),
            ("{{ pagenum|inc }}", i64::MAX),
            ("{{ dec(pagenum) }}", i64::MIN),
        ] {
            let ctx = Ctx {
                pagenum,
                ..ctx()
            };
            let err = plain().render_str(text, &ctx, "t").unwrap_err();
            assert!(
                matches!(&err, TemplateError::Render { source, .. }
                    if source.kind() == ErrorKind::InvalidOperation),
                "{err}"
            );
        }
    }

    #[test]
    fn first_returns_first_character() {
        let out = plain().render_str("{{ first(title) }}", &ctx(), "t").unwrap();
        assert_eq!(out, "Ё");
    }

    #[test]
    fn first_of_empty_string_is_empty() {
        assert_eq!(first(String::new()), "");
    }

    #[test]
    fn html_is_not_escaped() {
        #[derive(Serialize)]
        struct Body {
            content: &'static str,
        }
        let out = plain()
            .render_str("{{ content }}", &Body { content: "<p>a & b</p>" }, "page.html")
            .unwrap();
        assert_eq!(out, "<p>a & b</p>");
    }

    #[test]
    fn trailing_newline_kept() {
        let out = plain().render_str("{{ slug }}\n", &ctx(), "t").unwrap();
        assert_eq!(out, "index.html\n");
    }

    #[test]
    fn fragments_are_available_by_file_name() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("header.tmpl"), "<h1>{{ title }}</h1>").unwrap();
        fs::write(tmp.path().join("ignored.txt"), "{{ broken").unwrap();

        let renderer = Renderer::new(Some(tmp.path()), "tmpl").unwrap();
        let out = renderer
            .render_str("{% include \"header.tmpl\" %}|{{ slug }}", &ctx(), "index.html")
            .unwrap();
        assert_eq!(out, "<h1>Ёлка</h1>|index.html");
    }

    #[test]
    fn render_reads_template_file() {
        let tmp = TempDir::new().unwrap();
        let page = tmp.path().join("page.html");
        fs::write(&page, "[{{ slug }}]").unwrap();

        let out = render(&page, None, "tmpl", &ctx(), "page.html").unwrap();
        assert_eq!(out, "[index.html]");
    }

    #[test]
    fn syntax_error_is_surfaced() {
        let err = plain().render_str("{% if %}", &ctx(), "bad.html").unwrap_err();
        match err {
            TemplateError::Render { name, .. } => assert_eq!(name, "bad.html"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn broken_fragment_fails_construction() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("broken.tmpl"), "{% for %}").unwrap();
        assert!(matches!(
            Renderer::new(Some(tmp.path()), "tmpl"),
            Err(TemplateError::Render { .. })
        ));
    }

    #[test]
    fn missing_template_file_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = plain()
            .render(&tmp.path().join("nope.html"), &ctx(), "nope.html")
            .unwrap_err();
        assert!(matches!(err, TemplateError::Io { .. }));
    }
}
