//! CLI entry point for the socrata catalog browser.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use socrata::{Client, display, select_permalink};
use tracing::debug;

mod cli;

use cli::{Args, Command};

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over -v; logs go to stderr so tables on stdout stay clean
    let default_level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let verify = args.insecure.then_some(false);
    let mut client = Client::new(args.catalog_url.clone(), verify)
        .context("failed to configure catalog client")?
        .with_progress(!args.no_progress);
    if let Some(secs) = args.timeout {
        client = client.with_timeout(Duration::from_secs(secs))?;
    }
    debug!(catalog = client.catalog_url(), "catalog client ready");

    match args.command {
        Command::Domains { url } => {
            let domains = client.list_domains(url.as_deref())?;
            print!("{}", display::domain_table(&domains));
        }
        Command::Datasets { domain } => {
            let domains = client.list_domains(None)?;
            let datasets = client
                .list_datasets(&domains, domain)
                .context("failed to list datasets")?;
            print!("{}", display::dataset_table(&datasets));
        }
        Command::Download {
            domain,
            dataset,
            dir,
        } => {
            let domains = client.list_domains(None)?;
            let datasets = client
                .list_datasets(&domains, domain)
                .context("failed to list datasets")?;
            let permalink = select_permalink(&datasets, dataset)?;
            let path = client
                .download(permalink, &dir)
                .with_context(|| format!("failed to download {}", permalink))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
