use clap::{Parser, Subcommand};
use sitemill::{config, output, pipeline};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Source and destination of a build.
#[derive(clap::Args, Clone)]
struct TreeArgs {
    /// Source directory
    #[arg(long)]
    source: PathBuf,

    /// Destination directory (must exist)
    #[arg(long)]
    destination: PathBuf,
}

#[derive(Parser)]
#[command(name = "sitemill")]
#[command(about = "Incremental static site compiler for template-driven sites")]
#[command(long_about = "\
Incremental static site compiler for template-driven sites

The source tree is the site. Folders are mirrored into the destination,
page files are rendered through templates, everything else is copied.
Reserved folders hold settings and structured content:

  site/
  ├── __settings/                  # Templates for generated pages
  │   ├── config.toml              # Optional, see 'sitemill gen-config'
  │   ├── tags.xml                 # Blog categories
  │   ├── articles.html            # Article listing
  │   ├── article.html             # Article contents page (optional)
  │   ├── page.html                # Article page
  │   ├── blog.html                # Blog listing
  │   ├── post.html                # Blog post
  │   └── qa.html                  # Q&A page
  ├── __templates/*.tmpl           # Shared fragments ({% include \"header.tmpl\" %})
  ├── __articles/*.xml             # Articles, page bodies in <slug>/N.html
  ├── __blog/**/*.xml              # Blog posts
  ├── __qa/**/*.xml                # Questions and answers
  ├── __hash/                      # Checksum cache (created by builds)
  ├── assets/                      # Copied verbatim, never rendered
  ├── _draft.html                  # Leading underscore: skipped
  ├── index.html                   # Rendered with {{ slug }}
  └── 404.html                     # Rendered, left out of sitemap.xml

Unchanged pages are not rewritten, so their modification times survive
repeated builds.")]
#[command(version)]
struct Cli {
    /// Log every file decision
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the full pipeline: sync → collections → compile → sitemap
    Build {
        #[command(flatten)]
        tree: TreeArgs,

        /// Site origin used in sitemap.xml, e.g. https://example.com
        #[arg(long)]
        domain: String,

        /// Ignore cached checksums and rewrite every generated page
        #[arg(long)]
        no_cache: bool,
    },
    /// Align destination directories with the source without rendering
    Sync {
        #[command(flatten)]
        tree: TreeArgs,
    },
    /// Validate config and content records without writing anything
    Check {
        /// Source directory
        #[arg(long)]
        source: PathBuf,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build {
            tree,
            domain,
            no_cache,
        } => {
            println!(
                "==> Building {} → {}",
                tree.source.display(),
                tree.destination.display()
            );
            let report = pipeline::build(&pipeline::BuildOptions {
                source: tree.source,
                destination: tree.destination.clone(),
                domain,
                no_cache,
            })?;
            output::print_build_report(&report);
            println!("==> Build complete: {}", tree.destination.display());
        }
        Command::Sync { tree } => {
            let report = pipeline::sync_tree(&tree.source, &tree.destination)?;
            output::print_sync_output(&report);
        }
        Command::Check { source } => {
            println!("==> Checking {}", source.display());
            let inventory = pipeline::check(&source)?;
            output::print_check_output(&inventory);
            println!("==> Content is valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
