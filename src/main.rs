//! CLI entry point for mdx-content

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mdx_content::commands::{self, Target};
use mdx_content::ContentSite;

#[derive(Parser)]
#[command(name = "mdx-content")]
#[command(version)]
#[command(about = "Load, normalize and compile MDX content collections", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List a collection, newest first
    #[command(alias = "ls")]
    List {
        /// Collection name from _content.yml
        collection: Option<String>,

        /// Content directory, relative to the source directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Content type label
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,

        /// Keep the compiled body of every record
        #[arg(long)]
        full: bool,

        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Show one record as JSON
    Show {
        /// Slug (file name without .mdx)
        slug: String,

        /// Collection name from _content.yml
        #[arg(short = 'C', long)]
        collection: Option<String>,

        /// Content directory, relative to the source directory
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Content type label
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,
    },

    /// Count tag usage in a collection
    Tags {
        /// Collection name from _content.yml
        collection: Option<String>,

        /// Content directory, relative to the source directory
        #[arg(long)]
        dir: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "mdx_content=debug,info"
    } else {
        "mdx_content=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::List {
            collection,
            dir,
            content_type,
            full,
            json,
        } => {
            let site = ContentSite::new(&base_dir)?;
            let target = Target::resolve(&site, collection.as_deref(), dir, content_type)?;
            commands::list::run(&site, &target, full, json).await?;
        }

        Commands::Show {
            slug,
            collection,
            dir,
            content_type,
        } => {
            let site = ContentSite::new(&base_dir)?;
            let target = Target::resolve(&site, collection.as_deref(), dir, content_type)?;
            commands::show::run(&site, &target, &slug).await?;
        }

        Commands::Tags { collection, dir } => {
            let site = ContentSite::new(&base_dir)?;
            let target = Target::resolve(&site, collection.as_deref(), dir, None)?;
            commands::tags::run(&site, &target).await?;
        }

        Commands::Version => {
            println!("mdx-content version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
