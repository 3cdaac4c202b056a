//! Response decoding: head/body split, header folding and chunked bodies.

use crate::http::cookie::{Cookie, CookieJar};
use crate::http::response::ResponseHeaders;

/// Status and headers extracted from a response head.
#[derive(Debug, Clone, Default)]
pub struct ParsedHead {
    pub status: u16,
    pub status_line: String,
    pub headers: ResponseHeaders,
    pub set_cookie_raw: String,
    pub cookies: CookieJar,
}

/// Position of the first `\r\n\r\n`, if any.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Split raw response bytes at the head length reported by the transport.
pub fn split_header_body(raw: &[u8], header_len: usize) -> (&[u8], &[u8]) {
    raw.split_at(header_len.min(raw.len()))
}

pub fn parse_headers(block: &[u8]) -> ParsedHead {
    let text = String::from_utf8_lossy(block);
    let mut head = ParsedHead::default();
    let mut seen_status = false;

    for line in text.split('\n') {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if !seen_status {
            seen_status = true;
            head.status = status_code(line);
            head.status_line = line.to_string();
            continue;
        }

        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if name.is_empty() {
            continue;
        }
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim_start().to_string();

        if name == "set-cookie" {
            head.set_cookie_raw.push_str(&value);
            head.set_cookie_raw.push(';');
            if let Some(cookie) = Cookie::parse(&value) {
                head.cookies.insert(cookie);
            }
            head.headers.append_multi(name, value);
        } else {
            head.headers.append(name, value);
        }
    }

    head
}

/// Numeric code following `HTTP/<version>` on the status line, or `0`.
fn status_code(line: &str) -> u16 {
    let Some(idx) = line.to_ascii_uppercase().find("HTTP/") else {
        return 0;
    };
    line[idx..]
        .split_whitespace()
        .skip(1)
        .find_map(|token| {
            let digits: String = token.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().ok()
        })
        .unwrap_or(0)
}

/// Whether the body needs chunked decoding.
pub fn is_chunked(headers: &ResponseHeaders) -> bool {
    headers
        .first("transfer-encoding")
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("chunked"))
}

/// Reassemble a chunked body.
///
/// Walks size-line / data pairs until the input runs out. A zero-size chunk
/// does not stop the walk and trailers are not interpreted, so bodies from
/// servers that get the framing slightly wrong still come through.
pub fn decode_chunked(body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(body.len());
    let mut pos = 0;

    while pos < body.len() {
        let Some(line_len) = body[pos..].windows(2).position(|w| w == b"\r\n") else {
            break;
        };
        let size = chunk_size(&body[pos..pos + line_len]);
        pos += line_len + 2;

        let end = pos.saturating_add(size).min(body.len());
        out.extend_from_slice(&body[pos..end]);
        pos = end;

        if body[pos..].starts_with(b"\r\n") {
            pos += 2;
        }
    }

    out
}

fn chunk_size(line: &[u8]) -> usize {
    let line = String::from_utf8_lossy(line);
    let hex = line.split(';').next().unwrap_or("").trim();
    usize::from_str_radix(hex, 16).unwrap_or(0)
}
