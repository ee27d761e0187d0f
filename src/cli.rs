//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Browse Socrata open-data catalogs and download datasets.
///
/// Indices are the 1-based numbers printed by `domains` and `datasets`;
/// when omitted the first entry is used.
#[derive(Parser, Debug)]
#[command(name = "socrata")]
#[command(author, version, about)]
pub struct Args {
    /// Increase log verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Catalog API base URL (overrides SOCRATA_CATALOG_URL and .socratarc)
    #[arg(long, global = true)]
    pub catalog_url: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Do not draw a download progress bar
    #[arg(long, global = true)]
    pub no_progress: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List domains that publish at least one dataset
    Domains {
        /// Fetch the domain list from this URL instead of the catalog
        #[arg(long)]
        url: Option<String>,
    },

    /// List the datasets of a domain
    Datasets {
        /// Domain index as printed by `domains`
        domain: Option<usize>,
    },

    /// Download a dataset's rows
    Download {
        /// Domain index as printed by `domains`
        domain: Option<usize>,

        /// Dataset index as printed by `datasets`
        dataset: Option<usize>,

        /// Directory to write the file into
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}
