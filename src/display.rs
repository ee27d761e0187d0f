//! Indexed console tables for domains and datasets.
//!
//! Indices are 1-based and line up with the selection index accepted by
//! [`Client::list_datasets`](crate::Client::list_datasets) and
//! [`select_permalink`](crate::select_permalink).

use std::fmt::Write;

use crate::catalog::{Dataset, Domain};

pub fn domain_table(domains: &[Domain]) -> String {
    let mut out = String::new();
    for (i, d) in domains.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:<5} {:<45} has {} datasets",
            i + 1,
            d.name,
            d.count
        );
    }
    out
}

pub fn dataset_table(datasets: &[Dataset]) -> String {
    let mut out = String::new();
    for (i, d) in datasets.iter().enumerate() {
        let _ = writeln!(out, "{:<5} {:<45} {}", i + 1, d.name, d.description);
    }
    out
}
