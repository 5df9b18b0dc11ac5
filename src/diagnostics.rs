//! Recoverable build conditions.
//!
//! Most failures abort the build. A few do not corrupt already-written
//! output and are collected instead: a stale destination directory or
//! generated page that could not be removed, an article page body that is
//! missing on disk, or a source file shadowed by generated output.
//! Stages return these as [`Warning`] values in their reports so the caller
//! decides how to surface them.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A destination directory with no source counterpart survived cleanup.
    StaleDirNotRemoved { path: PathBuf, reason: String },
    /// An article lists a page whose body file is absent or unreadable.
    MissingArticlePage { article: String, page: usize, path: PathBuf },
    /// A generated file or folder no collection produces anymore survived cleanup.
    StaleOutputNotRemoved { path: PathBuf, reason: String },
    /// A source file maps onto a destination path owned by generated output.
    OutputCollision { path: PathBuf, output: String },
}

impl Warning {
    /// Emit the warning through `tracing`.
    pub fn log(&self) {
        tracing::warn!("{self}");
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::StaleDirNotRemoved { path, reason } => {
                write!(f, "could not remove {}: {}", path.display(), reason)
            }
            Warning::MissingArticlePage {
                article,
                page,
                path,
            } => write!(
                f,
                "article '{}' page {} has no content at {}",
                article,
                page,
                path.display()
            ),
            Warning::StaleOutputNotRemoved { path, reason } => {
                write!(f, "could not remove stale output {}: {}", path.display(), reason)
            }
            Warning::OutputCollision { path, output } => write!(
                f,
                "{} not compiled: '{}' in the destination is generated",
                path.display(),
                output
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_stale_dir() {
        let w = Warning::StaleDirNotRemoved {
            path: PathBuf::from("/out/old"),
            reason: "permission denied".into(),
        };
        assert_eq!(w.to_string(), "could not remove /out/old: permission denied");
    }

    #[test]
    fn display_missing_page() {
        let w = Warning::MissingArticlePage {
            article: "rust".into(),
            page: 2,
            path: PathBuf::from("/src/__articles/rust/2.html"),
        };
        assert_eq!(
            w.to_string(),
            "article 'rust' page 2 has no content at /src/__articles/rust/2.html"
        );
    }

    #[test]
    fn display_collision() {
        let w = Warning::OutputCollision {
            path: PathBuf::from("/src/sitemap.xml"),
            output: "sitemap.xml".into(),
        };
        assert_eq!(
            w.to_string(),
            "/src/sitemap.xml not compiled: 'sitemap.xml' in the destination is generated"
        );
    }
}
