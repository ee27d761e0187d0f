//! A small Rust client for Socrata open-data catalogs.
//!
//! This crate implements a browse-then-download flow:
//! list the catalog's domains, list the datasets of one domain, pick a
//! dataset and download its rows to a local file.
//!
//! ## Quick start
//! - Optionally point the client at another catalog via `SOCRATA_CATALOG_URL` or a
//!   `.socratarc` file (supported in the current directory and in your home directory).
//! - Selection indices are 1-based, as printed by the [`display`] tables.
//!
//! ```no_run
//! use socrata::{Client, select_permalink};
//!
//! fn main() -> socrata::Result<()> {
//!     let client = Client::from_env()?;
//!     let domains = client.list_domains(None)?;
//!     let datasets = client.list_datasets(&domains, Some(1))?;
//!     let permalink = select_permalink(&datasets, Some(1))?;
//!     client.download(permalink, std::path::Path::new("."))?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]

mod catalog;
mod client;
mod config;
pub mod display;
mod error;
mod util;

pub use catalog::{
    Dataset, Decoded, Domain, PERMALINK_SUFFIX, datasets_from, decode_payload, domains_from,
    select_domain, select_permalink,
};
pub use client::{CATALOG_USER_AGENT, Client, ClientConfig, Payload};
pub use config::DEFAULT_CATALOG_URL;
pub use error::{Error, Result};
pub use util::selection_position;
