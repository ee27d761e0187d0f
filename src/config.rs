use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientConfig;
use crate::error::{Error, Result};

/// Public Socrata discovery API.
pub const DEFAULT_CATALOG_URL: &str = "https://api.us.socrata.com/api/catalog/v1";

pub(crate) const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Default, PartialEq)]
struct RcConfig {
    url: Option<String>,
    verify: Option<bool>,
    timeout: Option<Duration>,
}

pub(crate) fn load_config(url: Option<String>, verify: Option<bool>) -> Result<ClientConfig> {
    let url = url.or_else(|| env_value("SOCRATA_CATALOG_URL"));
    let verify = match verify {
        Some(v) => Some(v),
        None => env_value("SOCRATA_VERIFY")
            .map(|v| parse_bool("SOCRATA_VERIFY", &v))
            .transpose()?,
    };
    let timeout = env_value("SOCRATA_TIMEOUT")
        .map(|v| parse_timeout("SOCRATA_TIMEOUT", &v))
        .transpose()?;

    let mut file = RcConfig::default();
    if url.is_none() || verify.is_none() || timeout.is_none() {
        for rc_path in rc_candidates() {
            if rc_path.exists() {
                file = read_rc(&rc_path)?;
                break;
            }
        }
    }

    Ok(ClientConfig {
        url: url
            .or(file.url)
            .unwrap_or_else(|| DEFAULT_CATALOG_URL.to_string()),
        verify: verify.or(file.verify).unwrap_or(true),
        timeout: timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT),
    })
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn read_rc(path: &Path) -> Result<RcConfig> {
    let text = std::fs::read_to_string(path).map_err(|source| Error::Config {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rc(&text)
}

fn parse_rc(text: &str) -> Result<RcConfig> {
    let mut cfg = RcConfig::default();

    // A value may sit on the line after a bare `key:`.
    let mut pending_key: Option<&str> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(pk) = pending_key.take() {
            if !line.contains(':') || looks_like_url(line) {
                apply(&mut cfg, pk, strip_quotes(line))?;
                continue;
            }
        }

        if let Some((k, v)) = line.split_once(':') {
            let k = k.trim();
            let v = strip_quotes(v.trim());
            if v.is_empty() {
                pending_key = Some(k);
            } else {
                apply(&mut cfg, k, v)?;
            }
        }
    }

    Ok(cfg)
}

fn apply(cfg: &mut RcConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "url" => cfg.url = Some(value.to_string()),
        "verify" => cfg.verify = Some(parse_bool(key, value)?),
        "timeout" => cfg.timeout = Some(parse_timeout(key, value)?),
        _ => {}
    }
    Ok(())
}

fn looks_like_url(line: &str) -> bool {
    let line = strip_quotes(line);
    line.starts_with("http://") || line.starts_with("https://")
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(Error::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn parse_timeout(key: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::InvalidConfig {
            key: key.to_string(),
            value: value.to_string(),
        })
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim();
    ['"', '\'']
        .iter()
        .find_map(|q| s.strip_prefix(*q)?.strip_suffix(*q))
        .unwrap_or(s)
}

fn rc_candidates() -> Vec<PathBuf> {
    // 1) SOCRATA_RC (explicit)
    // 2) ./.socratarc
    // 3) ~/.socratarc
    if let Some(p) = env_value("SOCRATA_RC") {
        return vec![PathBuf::from(p)];
    }

    let mut v = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        v.push(cwd.join(".socratarc"));
    }
    if let Some(home) = dirs::home_dir() {
        v.push(home.join(".socratarc"));
    }
    v
}
