//! Request message construction: effective target, body and header block.

use std::path::Path;
use std::time::Duration;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use url::form_urlencoded;

use crate::error::Result;
use crate::files;
use crate::http::location::{self, ResolvedUrl};
use crate::http::request::{HttpVersion, Proxy, RequestSpec};

/// A fully composed request, ready for either transport.
#[derive(Debug, Clone)]
pub struct Outbound {
    pub method: String,
    pub version: HttpVersion,
    /// Absolute URL actually requested, query string included.
    pub target: String,
    pub url: ResolvedUrl,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
    pub timeout: Duration,
    pub proxy: Option<Proxy>,
}

impl Outbound {
    /// Request line and headers, terminated by the blank line.
    pub fn header_block(&self) -> Vec<u8> {
        serialize_head(&self.method, &self.url, self.version, &self.headers)
    }
}

/// Compose the outbound message for `spec`.
pub fn prepare(spec: &RequestSpec) -> Result<Outbound> {
    let target = effective_target(spec);
    let url = location::resolve(&target)?;

    let body = if spec.is_post() {
        build_body(spec)
    } else {
        Vec::new()
    };
    let headers = build_headers(spec, &url, body.len());

    Ok(Outbound {
        method: spec.method().to_string(),
        version: spec.http_version,
        target,
        url,
        headers,
        body,
        timeout: Duration::from_secs(spec.timeout_secs()),
        proxy: spec.proxy.clone(),
    })
}

/// The configured target, with GET parameters appended as a query string.
pub fn effective_target(spec: &RequestSpec) -> String {
    let target = spec.target();
    if spec.method() != "GET" || spec.params.is_empty() {
        return target.to_string();
    }

    let query = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(spec.params.iter())
        .finish();
    let (base, fragment) = target.split_at(target.find('#').unwrap_or(target.len()));
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}{query}{fragment}")
}

/// Request body for the current mode.
///
/// Without params the raw body goes out verbatim. With params the body is
/// urlencoded, preceded by the raw body and a CRLF when one is set.
pub fn build_body(spec: &RequestSpec) -> Vec<u8> {
    if spec.multipart {
        return build_multipart(spec);
    }
    if spec.params.is_empty() {
        return spec.raw_body.clone();
    }

    let mut body = Vec::new();
    if !spec.raw_body.is_empty() {
        body.extend_from_slice(&spec.raw_body);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(&build_urlencoded(spec));
    body
}

fn build_urlencoded(spec: &RequestSpec) -> Vec<u8> {
    spec.params
        .iter()
        .map(|(k, v)| {
            let key: String = form_urlencoded::byte_serialize(k.as_bytes()).collect();
            format!("{}={}", key, urlencoding::encode(v))
        })
        .collect::<Vec<_>>()
        .join("&")
        .into_bytes()
}

fn build_multipart(spec: &RequestSpec) -> Vec<u8> {
    let delimiter = format!("--{}\r\n", spec.boundary);
    let mut out = Vec::new();

    if !spec.raw_body.is_empty() {
        out.extend_from_slice(delimiter.as_bytes());
        out.extend_from_slice(&spec.raw_body);
        out.extend_from_slice(b"\r\n");
    }

    for (name, value) in spec.params.iter() {
        match value.strip_prefix('@') {
            Some(path) => {
                let path = Path::new(path);
                let Some((bytes, mime)) = files::sniff(path) else {
                    continue;
                };
                let filename = path
                    .file_name()
                    .map(|f| f.to_string_lossy().into_owned())
                    .unwrap_or_default();

                out.extend_from_slice(delimiter.as_bytes());
                out.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                         Content-Type: {mime}\r\n\
                         Content-Transfer-Encoding: binary\r\n\r\n"
                    )
                    .as_bytes(),
                );
                out.extend_from_slice(&bytes);
                out.extend_from_slice(b"\r\n");
            }
            None => {
                out.extend_from_slice(delimiter.as_bytes());
                out.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
        }
    }

    out.extend_from_slice(format!("--{}--\r\n", spec.boundary).as_bytes());
    out
}

/// `Content-Type` value, boundary parameter included for multipart.
pub fn content_type(spec: &RequestSpec) -> Option<String> {
    if spec.mime_content_type.is_empty() {
        return None;
    }
    Some(if spec.multipart {
        format!("{}; boundary={}", spec.mime_content_type, spec.boundary)
    } else {
        spec.mime_content_type.clone()
    })
}

/// Copy the multipart `Content-Type` into the caller's own header list.
///
/// The native transport only sees `spec.headers`, so it relies on this.
pub fn inject_multipart_content_type(spec: &mut RequestSpec) {
    if !spec.multipart {
        return;
    }
    if let Some(value) = content_type(spec) {
        spec.headers.set("Content-Type", value);
    }
}

/// Headers in wire order: `Host`, `User-Agent`, caller headers, then the
/// generated entity/auth/cookie headers and `Connection: close`.
pub fn build_headers(spec: &RequestSpec, url: &ResolvedUrl, body_len: usize) -> Vec<(String, String)> {
    let mut headers = vec![
        ("Host".to_string(), url.host_header()),
        ("User-Agent".to_string(), spec.user_agent.clone()),
    ];

    headers.extend(spec.headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));

    if !spec.headers.contains("Content-Type") {
        if let Some(value) = content_type(spec) {
            headers.push(("Content-Type".to_string(), value));
        }
    }

    if let Some(auth) = &spec.auth {
        let token = BASE64.encode(format!("{}:{}", auth.username, auth.password));
        headers.push(("Authorization".to_string(), format!("Basic {token}")));
    }

    if let Some(cookies) = spec.cookies.header_value(&url.host) {
        headers.push(("Cookie".to_string(), cookies));
    }

    if body_len > 0 && spec.is_post() {
        headers.push(("Content-Length".to_string(), body_len.to_string()));
    }

    headers.push(("Connection".to_string(), "close".to_string()));
    headers
}

pub fn build_header_block(spec: &RequestSpec, url: &ResolvedUrl, body_len: usize) -> Vec<u8> {
    let headers = build_headers(spec, url, body_len);
    serialize_head(spec.method(), url, spec.http_version, &headers)
}

fn serialize_head(
    method: &str,
    url: &ResolvedUrl,
    version: HttpVersion,
    headers: &[(String, String)],
) -> Vec<u8> {
    let mut buf = Vec::new();

    buf.extend_from_slice(
        format!("{} {} HTTP/{}\r\n", method, url.request_path(), version.as_str()).as_bytes(),
    );

    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    buf.extend_from_slice(b"\r\n");
    buf
}
