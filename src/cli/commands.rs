use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rss-generator")]
#[command(about = "Scrape news and blog sites into RSS feeds and publish them to MinIO")]
#[command(version)]
pub struct Cli {
    /// Debug logging for this crate (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the built-in sites
    List {
        /// Print the site table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scrape a site, build its feed and upload it
    Generate {
        /// Site id (see `list`)
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        site: Option<String>,

        /// Generate every site; failures don't stop the others
        #[arg(long)]
        all: bool,

        /// Write feeds to this directory instead of uploading them
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Fetch each article page and embed its full content
        #[arg(long)]
        full_content: bool,
    },

    /// Check the storage configuration
    Check {
        /// Also send a request to the MinIO endpoint
        #[arg(long)]
        ping: bool,
    },
}
