use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by catalog operations.
///
/// Malformed catalog payloads are not represented here: they surface as
/// [`Decoded::Malformed`](crate::Decoded::Malformed) and the listing
/// operations degrade to an empty list.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, TLS, timeout or body read failure.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("catalog request failed: HTTP {status} for url ({url}){}", fmt_message(.message))]
    Status {
        url: String,
        status: u16,
        message: Option<String>,
    },

    /// A 1-based selection index points past the end of the list.
    #[error("index {index} is out of range for a list of {len} item(s)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The URL has no final path segment to name a downloaded file after.
    #[error("cannot derive a file name from url ({url})")]
    InvalidUrl { url: String },

    /// Filesystem failure while writing a download.
    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file exists but could not be read.
    #[error("failed to read configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration value could not be interpreted.
    #[error("invalid configuration value for `{key}`: {value}")]
    InvalidConfig { key: String, value: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

fn fmt_message(message: &Option<String>) -> String {
    match message {
        Some(m) if !m.is_empty() => format!(": {}", m),
        _ => String::new(),
    }
}

/// Error body returned by the catalog API.
///
/// Seen shapes: `{"error": "..."}`, `{"message": "..."}` and
/// `{"code": "...", "message": "..."}`.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct CatalogErrorResponse {
    #[serde(default)]
    pub(crate) error: Option<serde_json::Value>,
    #[serde(default)]
    pub(crate) message: Option<String>,
    #[serde(default)]
    pub(crate) code: Option<String>,
}

impl CatalogErrorResponse {
    fn summary(&self) -> Option<String> {
        let error = match &self.error {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(serde_json::Value::Bool(_)) | None => None,
            Some(other) => Some(other.to_string()),
        };
        let text = error.or_else(|| self.message.clone())?;
        match &self.code {
            Some(code) if !code.is_empty() => Some(format!("{} ({})", text, code)),
            _ => Some(text),
        }
    }
}

pub(crate) fn status_error(status: StatusCode, url: &str, body: &str) -> Error {
    let message = serde_json::from_str::<CatalogErrorResponse>(body)
        .ok()
        .and_then(|e| e.summary())
        .or_else(|| {
            let body = body.trim();
            if body.is_empty() || body.starts_with('<') {
                status.canonical_reason().map(str::to_string)
            } else {
                Some(body.chars().take(200).collect())
            }
        });

    Error::Status {
        url: url.to_string(),
        status: status.as_u16(),
        message,
    }
}
