use std::borrow::Cow;

use crate::http::cookie::{Cookie, CookieJar};

/// A response header value; names seen more than once become `Multiple`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// First value in arrival order.
    pub fn first(&self) -> &str {
        match self {
            HeaderValue::Single(v) => v,
            HeaderValue::Multiple(vs) => vs.first().map(String::as_str).unwrap_or(""),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            HeaderValue::Single(v) => vec![v.as_str()],
            HeaderValue::Multiple(vs) => vs.iter().map(String::as_str).collect(),
        }
    }

    fn push(&mut self, value: String) {
        match self {
            HeaderValue::Single(first) => {
                *self = HeaderValue::Multiple(vec![std::mem::take(first), value]);
            }
            HeaderValue::Multiple(vs) => vs.push(value),
        }
    }
}

/// Lower-cased response headers in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaders {
    entries: Vec<(String, HeaderValue)>,
}

impl ResponseHeaders {
    /// Fold one header line in. `name` must already be lower-cased.
    pub fn append(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, HeaderValue::Single(value))),
        }
    }

    /// Like `append`, but a fresh entry starts out as a sequence.
    pub fn append_multi(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((name, HeaderValue::Multiple(vec![value]))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        let name = name.to_ascii_lowercase();
        self.entries.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name).map(HeaderValue::first)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// What the last completed exchange produced.
#[derive(Debug, Clone, Default)]
pub struct ResponseResult {
    pub(crate) status: u16,
    pub(crate) status_line: String,
    pub(crate) headers: ResponseHeaders,
    pub(crate) set_cookie_raw: String,
    pub(crate) cookies: CookieJar,
    pub(crate) body: Vec<u8>,
    pub(crate) redirects: u32,
}

impl ResponseResult {
    /// Status code, `0` until a response was parsed.
    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn headers(&self) -> &ResponseHeaders {
        &self.headers
    }

    pub fn header(&self, name: &str) -> Option<&HeaderValue> {
        self.headers.get(name)
    }

    pub fn header_first(&self, name: &str) -> Option<&str> {
        self.headers.first(name)
    }

    /// Every `Set-Cookie` value seen, each followed by `;`.
    pub fn set_cookie_raw(&self) -> &str {
        &self.set_cookie_raw
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn cookie(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Redirect hops followed to reach this response.
    pub fn redirects(&self) -> u32 {
        self.redirects
    }

    /// Clear everything except the hop counter.
    pub(crate) fn clear_keeping_hops(&mut self) {
        let redirects = self.redirects;
        *self = ResponseResult {
            redirects,
            ..ResponseResult::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_keeps_hop_counter() {
        let mut result = ResponseResult {
            status: 302,
            redirects: 2,
            body: b"x".to_vec(),
            ..ResponseResult::default()
        };
        result.clear_keeping_hops();
        assert_eq!(result.status(), 0);
        assert!(result.body().is_empty());
        assert_eq!(result.redirects(), 2);
    }
}
