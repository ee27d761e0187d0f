//! Catalog records and the extraction logic that turns decoded payloads
//! into domain and dataset lists.

use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::util::selection_position;

/// Suffix appended to every dataset permalink to fetch its rows as JSON.
pub const PERMALINK_SUFFIX: &str = ".json";

const UNKNOWN: &str = "none";

/// A publisher domain and the number of datasets it exposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Domain {
    pub name: String,
    pub count: u64,
}

/// One dataset listed in a domain's catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub name: String,
    pub description: String,
    /// Dataset permalink with [`PERMALINK_SUFFIX`] appended.
    pub permalink: String,
    pub updated_at: String,
}

/// Outcome of decoding a catalog payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Json(Value),
    Malformed { reason: String },
}

impl Decoded {
    /// Records under the top-level `results` key.
    ///
    /// Empty for malformed payloads and for payloads without a `results` array.
    pub fn results(&self) -> &[Value] {
        match self {
            Decoded::Json(value) => value
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
            Decoded::Malformed { .. } => &[],
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Decoded::Malformed { .. })
    }
}

/// Parses a payload as JSON, logging instead of failing on malformed input.
pub fn decode_payload(payload: &str) -> Decoded {
    match serde_json::from_str(payload) {
        Ok(value) => Decoded::Json(value),
        Err(e) => {
            warn!(error = %e, "json conversion error");
            Decoded::Malformed {
                reason: e.to_string(),
            }
        }
    }
}

/// Extracts domains with at least one dataset, in response order.
///
/// Counts are whole numbers; a float count is truncated, so anything below
/// `1.0` (and any non-numeric count) is treated as zero and dropped.
pub fn domains_from(decoded: &Decoded) -> Vec<Domain> {
    decoded
        .results()
        .iter()
        .filter_map(Value::as_object)
        .filter_map(|record| {
            let mut name = UNKNOWN.to_string();
            let mut count = 0u64;
            for (k, v) in record {
                match k.as_str() {
                    "domain" | "thing" => name = text_of(v),
                    _ => count = count_of(v),
                }
            }
            (count > 0).then_some(Domain { name, count })
        })
        .collect()
}

/// Extracts every record carrying both a `resource` object and a `permalink`.
pub fn datasets_from(decoded: &Decoded) -> Vec<Dataset> {
    decoded
        .results()
        .iter()
        .filter_map(|record| {
            let resource = record.get("resource")?.as_object()?;
            let permalink = record.get("permalink")?.as_str()?;
            let field = |key: &str| {
                resource
                    .get(key)
                    .and_then(Value::as_str)
                    .unwrap_or(UNKNOWN)
                    .to_string()
            };
            Some(Dataset {
                name: field("name"),
                description: field("description"),
                permalink: format!("{}{}", permalink, PERMALINK_SUFFIX),
                updated_at: field("updatedAt"),
            })
        })
        .collect()
}

/// Domain name at a 1-based display index.
pub fn select_domain(domains: &[Domain], index: Option<usize>) -> Result<&str> {
    let position = selection_position(index, domains.len())?;
    Ok(&domains[position].name)
}

/// Permalink of the dataset at a 1-based display index.
pub fn select_permalink(datasets: &[Dataset], index: Option<usize>) -> Result<&str> {
    let position = selection_position(index, datasets.len())?;
    Ok(&datasets[position].permalink)
}

fn count_of(v: &Value) -> u64 {
    v.as_u64()
        .or_else(|| v.as_f64().filter(|f| *f >= 1.0).map(|f| f as u64))
        .unwrap_or(0)
}

fn text_of(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
