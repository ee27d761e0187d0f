use crate::error::{Error, Result};

/// Maps a 1-based display index onto a position in a list of `len` items.
///
/// `None` and `Some(0)` both select the first item.
pub fn selection_position(index: Option<usize>, len: usize) -> Result<usize> {
    let position = index.unwrap_or(0).saturating_sub(1);
    if position >= len {
        return Err(Error::IndexOutOfRange {
            index: index.unwrap_or(1).max(1),
            len,
        });
    }
    Ok(position)
}

/// Final `/`-delimited segment of the URL path, without query or fragment.
pub(crate) fn filename_from_url(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path
        .split_once("://")
        .map(|(_, rest)| rest.split_once('/').map_or("", |(_, p)| p))
        .unwrap_or(path);
    path.rsplit('/').next().and_then(|s| {
        if s.is_empty() {
            None
        } else {
            Some(s.to_string())
        }
    })
}

pub(crate) fn append_query(url: &str, params: &[(&str, &str)]) -> String {
    let mut out = url.to_string();
    let sep = if url.contains('?') { '&' } else { '?' };
    out.push(sep);
    let mut first = true;
    for (k, v) in params {
        if !first {
            out.push('&');
        }
        first = false;
        out.push_str(k);
        out.push('=');
        out.push_str(v);
    }
    out
}

/// `charset` parameter of a `Content-Type` header value, lowercased.
pub(crate) fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (k, v) = param.split_once('=')?;
        if !k.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let v = v.trim().trim_matches('"').trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_ascii_lowercase())
        }
    })
}
