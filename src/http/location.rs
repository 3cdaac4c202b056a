//! Target URL splitting and redirect `Location` resolution.

use url::Url;

use crate::error::{EngineError, Result};

/// Connection coordinates and request path of a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub scheme: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: Option<String>,
    /// Connection must be wrapped in TLS (`https`).
    pub tls: bool,
    explicit_port: bool,
}

impl ResolvedUrl {
    /// Path plus `?query` as it appears on the request line.
    pub fn request_path(&self) -> String {
        match &self.query {
            Some(q) => format!("{}?{}", self.path, q),
            None => self.path.clone(),
        }
    }

    /// Value of the `Host` header.
    pub fn host_header(&self) -> String {
        if self.explicit_port {
            format!("{}:{}", self.host, self.port)
        } else {
            self.host.clone()
        }
    }

    /// `host:port` to open a socket against.
    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn origin(&self) -> String {
        format!("{}://{}", self.scheme, self.host_header())
    }
}

pub fn resolve(target: &str) -> Result<ResolvedUrl> {
    let url = Url::parse(target).map_err(|e| EngineError::MalformedUrl(format!("{target}: {e}")))?;

    let host = match url.host_str() {
        Some(h) if !h.is_empty() => h.to_string(),
        _ => return Err(EngineError::MalformedUrl(format!("{target}: missing host"))),
    };

    let scheme = url.scheme().to_ascii_lowercase();
    let default_port = match scheme.as_str() {
        "https" => 443,
        _ => 80,
    };
    let port = url.port().unwrap_or(default_port);

    let path = match url.path() {
        "" => "/".to_string(),
        p => p.to_string(),
    };

    Ok(ResolvedUrl {
        tls: scheme == "https",
        scheme,
        host,
        port,
        path,
        query: url.query().map(str::to_string),
        explicit_port: port != default_port,
    })
}

/// Turn a (possibly relative) `Location` value into an absolute URL.
pub fn resolve_redirect(location: &str, current: &str) -> Result<String> {
    let location = location.trim();
    if location.is_empty() {
        return Err(EngineError::MalformedUrl("empty redirect location".into()));
    }
    if has_scheme(location) {
        return Ok(location.to_string());
    }

    let base = current
        .find(['?', '#'])
        .map_or(current, |idx| &current[..idx]);

    if location.starts_with('#') || location.starts_with('?') {
        return Ok(format!("{base}{location}"));
    }

    let resolved = resolve(base)?;
    let dir = if location.starts_with('/') {
        ""
    } else {
        resolved.path.rfind('/').map_or("", |idx| &resolved.path[..idx])
    };

    let path = normalize_path(&format!("{dir}/{location}"));
    Ok(format!("{}{}", resolved.origin(), path))
}

fn has_scheme(location: &str) -> bool {
    match location.split_once(':') {
        Some((scheme, _)) => {
            let mut chars = scheme.chars();
            chars.next().is_some_and(|c| c.is_ascii_alphabetic())
                && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
                && !location[scheme.len() + 1..].starts_with(|c: char| c.is_ascii_digit())
        }
        None => false,
    }
}

/// Collapse `//` and `/./`, and fold `/segment/../`, until nothing changes.
fn normalize_path(path: &str) -> String {
    let mut current = path.to_string();
    loop {
        let next = collapse_once(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn collapse_once(path: &str) -> String {
    let mut out = path.replace("/./", "/");
    while out.contains("//") {
        out = out.replace("//", "/");
    }

    let segments: Vec<&str> = out.split('/').collect();
    let mut kept: Vec<&str> = Vec::with_capacity(segments.len());
    let last = segments.len().saturating_sub(1);
    for (i, seg) in segments.iter().enumerate() {
        // Only a `..` followed by another separator folds its predecessor.
        if *seg == ".." && i < last {
            if let Some(prev) = kept.last() {
                if !prev.is_empty() && *prev != ".." {
                    kept.pop();
                    continue;
                }
            }
        }
        kept.push(seg);
    }
    kept.join("/")
}
