use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use reqwest::blocking::{Client as HttpClient, Response};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, info};

use crate::catalog::{
    Dataset, Domain, datasets_from, decode_payload, domains_from, select_domain,
};
use crate::config::{DEFAULT_CATALOG_URL, DEFAULT_TIMEOUT, load_config};
use crate::error::{Error, Result, status_error};
use crate::util::{append_query, charset_from_content_type, filename_from_url};

/// User-Agent sent with every request.
pub const CATALOG_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; Win64; x64)";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog API base URL, typically `https://api.us.socrata.com/api/catalog/v1`.
    pub url: String,
    /// Whether to verify TLS certificates.
    pub verify: bool,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_CATALOG_URL.to_string(),
            verify: true,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Blocking client for the catalog API.
#[derive(Debug, Clone)]
pub struct Client {
    url: String,
    verify: bool,
    progress: bool,

    http: HttpClient,
}

/// Decoded body of a single GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub text: String,
    /// Charset declared in the response `Content-Type`, if any.
    pub charset: Option<String>,
}

impl Client {
    /// Creates a client using environment variables and/or `.socratarc`.
    ///
    /// This is equivalent to `Client::new(None, None)`.
    pub fn from_env() -> Result<Self> {
        Self::new(None, None)
    }

    /// Creates a client using (in order of precedence):
    /// - explicit `url`/`verify` arguments
    /// - environment variables `SOCRATA_CATALOG_URL` / `SOCRATA_VERIFY` / `SOCRATA_TIMEOUT`
    /// - config file from `SOCRATA_RC` or `.socratarc`
    pub fn new(url: Option<String>, verify: Option<bool>) -> Result<Self> {
        Self::from_config(load_config(url, verify)?)
    }

    pub fn from_config(cfg: ClientConfig) -> Result<Self> {
        let http = build_http(cfg.verify, cfg.timeout)?;
        Ok(Self {
            url: cfg.url,
            verify: cfg.verify,
            progress: true,
            http,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(self.verify, timeout)?;
        Ok(self)
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }

    /// Catalog API base URL this client queries.
    pub fn catalog_url(&self) -> &str {
        &self.url
    }

    /// GETs `url` and decodes the body with the charset the server declares.
    ///
    /// Falls back to UTF-8 when no charset is declared.
    pub fn retrieve_payload(&self, url: &str) -> Result<Payload> {
        info!(url, "retrieving payload");
        let resp = self.get(url)?;

        let charset = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let text = resp.text_with_charset("utf-8").map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(
            url,
            charset = charset.as_deref().unwrap_or("unspecified"),
            bytes = text.len(),
            "payload received"
        );

        Ok(Payload { text, charset })
    }

    /// Lists domains that publish at least one dataset.
    ///
    /// `url` overrides the `{catalog}/domains` endpoint.
    pub fn list_domains(&self, url: Option<&str>) -> Result<Vec<Domain>> {
        let url = match url {
            Some(u) => u.to_string(),
            None => format!("{}/domains", self.url.trim_end_matches('/')),
        };
        info!(url = %url, "listing catalog domains");

        let payload = self.retrieve_payload(&url)?;
        let domains = domains_from(&decode_payload(&payload.text));
        debug!(count = domains.len(), "domains with datasets");
        Ok(domains)
    }

    /// Lists datasets of the domain at a 1-based display index (`None` picks the first).
    pub fn list_datasets(&self, domains: &[Domain], index: Option<usize>) -> Result<Vec<Dataset>> {
        let domain = select_domain(domains, index)?;
        self.list_datasets_for(domain)
    }

    /// Lists datasets published by `domain`.
    pub fn list_datasets_for(&self, domain: &str) -> Result<Vec<Dataset>> {
        let url = append_query(&self.url, &[("domains", domain)]);
        info!(domain, url = %url, "listing domain datasets");

        let payload = self.retrieve_payload(&url)?;
        let datasets = datasets_from(&decode_payload(&payload.text));
        debug!(domain, count = datasets.len(), "datasets listed");
        Ok(datasets)
    }

    /// Streams `url` into `dir`, naming the file after the URL's last path segment.
    ///
    /// An existing file with that name is overwritten. Returns the written path.
    pub fn download(&self, url: &str, dir: &Path) -> Result<PathBuf> {
        let name = filename_from_url(url).ok_or_else(|| Error::InvalidUrl {
            url: url.to_string(),
        })?;
        let target = dir.join(name);
        info!(url, target = %target.display(), "downloading dataset");

        let mut resp = self.get(url)?;

        let io_err = |source| Error::Io {
            path: target.clone(),
            source,
        };
        let mut out = BufWriter::new(File::create(&target).map_err(io_err)?);

        let pb = if self.progress {
            Some(progress_bar(resp.content_length()))
        } else {
            None
        };

        let mut written: u64 = 0;
        let mut buf = [0u8; 64 * 1024];
        loop {
            let n = match resp.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(io_err(e)),
            };
            out.write_all(&buf[..n]).map_err(io_err)?;
            written += n as u64;
            if let Some(pb) = &pb {
                pb.inc(n as u64);
            }
        }
        out.flush().map_err(io_err)?;

        if let Some(pb) = &pb {
            pb.finish_and_clear();
        }
        info!(target = %target.display(), bytes = written, "dataset written to file");
        Ok(target)
    }

    fn get(&self, url: &str) -> Result<Response> {
        let resp = self.http.get(url).send().map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(status_error(status, url, &body));
        }
        Ok(resp)
    }
}

fn build_http(verify: bool, timeout: Duration) -> Result<HttpClient> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(USER_AGENT, HeaderValue::from_static(CATALOG_USER_AGENT));

    let mut builder = HttpClient::builder()
        .default_headers(default_headers)
        .timeout(timeout);

    if !verify {
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder.build().map_err(Error::Client)
}

fn progress_bar(len: Option<u64>) -> ProgressBar {
    match len {
        Some(len) => {
            let pb = ProgressBar::new(len);
            if let Ok(style) = ProgressStyle::with_template(
                "{spinner:.green} {bytes}/{total_bytes} ({bytes_per_sec}) {wide_bar} {eta}",
            ) {
                pb.set_style(style.progress_chars("=>-"));
            }
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::with_template("{spinner:.green} {bytes} ({bytes_per_sec})")
            {
                pb.set_style(style);
            }
            pb
        }
    }
}
