use serde::Deserialize;

use crate::config::ClientConfig;
use crate::http::cookie::{Cookie, CookieJar};
use crate::transport::TransportKind;

/// HTTP protocol version written on the request line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum HttpVersion {
    #[serde(rename = "1.0")]
    Http10,
    #[serde(rename = "1.1")]
    Http11,
}

impl HttpVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpVersion::Http10 => "1.0",
            HttpVersion::Http11 => "1.1",
        }
    }

    /// Parses `"1.0"` or `"1.1"`; anything else is rejected.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "1.0" => Some(HttpVersion::Http10),
            "1.1" => Some(HttpVersion::Http11),
            _ => None,
        }
    }
}

/// Ordered `name -> value` pairs with case-insensitive names.
///
/// Setting an existing name replaces its value in place, so serialization
/// order stays the order of first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList {
    entries: Vec<(String, String)>,
}

impl HeaderList {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(&name))
        {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Ordered request parameters; names are case-sensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn remove(&mut self, name: &str) {
        self.entries.retain(|(k, _)| k != name);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    /// `host:port` of a SOCKS5 proxy.
    pub address: String,
    pub credentials: Option<Credentials>,
}

/// Everything the caller configures before `execute`.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub http_version: HttpVersion,
    target: String,
    method: String,
    pub headers: HeaderList,
    pub params: Params,
    pub raw_body: Vec<u8>,
    pub cookies: CookieJar,
    pub user_agent: String,
    timeout_secs: u64,
    pub proxy: Option<Proxy>,
    pub auth: Option<Credentials>,
    pub multipart: bool,
    pub mime_content_type: String,
    pub boundary: String,
    pub follow_redirects: bool,
    max_redirects: u32,
    pub transport: TransportKind,
}

impl RequestSpec {
    pub fn from_config(cfg: &ClientConfig) -> Self {
        Self {
            http_version: cfg.http_version,
            target: String::new(),
            method: "GET".to_string(),
            headers: HeaderList::default(),
            params: Params::default(),
            raw_body: Vec::new(),
            cookies: CookieJar::new(),
            user_agent: cfg.user_agent.clone(),
            timeout_secs: cfg.timeout_secs.max(1),
            proxy: None,
            auth: None,
            multipart: false,
            mime_content_type: cfg.mime_content_type.clone(),
            boundary: cfg.boundary.clone(),
            follow_redirects: cfg.follow_redirects,
            max_redirects: cfg.max_redirects.max(1),
            transport: cfg.transport,
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }

    pub fn max_redirects(&self) -> u32 {
        self.max_redirects
    }

    pub fn set_target(&mut self, target: &str) -> &mut Self {
        self.target = target.trim().to_string();
        self
    }

    pub fn set_method(&mut self, method: &str) -> &mut Self {
        self.method = method.trim().to_ascii_uppercase();
        self
    }

    pub fn set_http_version(&mut self, version: HttpVersion) -> &mut Self {
        self.http_version = version;
        self
    }

    pub fn set_header(&mut self, name: &str, value: &str) -> &mut Self {
        self.headers.set(name.trim(), value.trim());
        self
    }

    /// Add a header given as a raw `Name: value` line. Lines without a
    /// colon are ignored.
    pub fn add_header_line(&mut self, line: &str) -> &mut Self {
        if let Some((name, value)) = line.split_once(':') {
            if !name.trim().is_empty() {
                self.set_header(name, value);
            }
        }
        self
    }

    pub fn set_referer(&mut self, referer: &str) -> &mut Self {
        self.set_header("Referer", referer)
    }

    pub fn remove_header(&mut self, name: &str) -> &mut Self {
        self.headers.remove(name);
        self
    }

    pub fn clear_headers(&mut self) -> &mut Self {
        self.headers.clear();
        self
    }

    /// Set one parameter. In multipart mode a value of `@/some/path` uploads
    /// that file.
    pub fn set_param(&mut self, name: &str, value: &str) -> &mut Self {
        self.params.set(name, value);
        self
    }

    /// Add parameters from a `a=1&b=2` string. Values are taken verbatim;
    /// a pair without `=` gets an empty value.
    pub fn add_params_str(&mut self, query: &str) -> &mut Self {
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            self.params.set(name, value);
        }
        self
    }

    pub fn remove_param(&mut self, name: &str) -> &mut Self {
        self.params.remove(name);
        self
    }

    pub fn clear_params(&mut self) -> &mut Self {
        self.params.clear();
        self
    }

    pub fn set_raw_body(&mut self, body: impl Into<Vec<u8>>) -> &mut Self {
        self.raw_body = body.into();
        self
    }

    pub fn set_cookie(&mut self, name: &str, value: &str) -> &mut Self {
        self.cookies.insert(Cookie::new(name, value));
        self
    }

    /// Add a cookie from a `Set-Cookie` style fragment. Unparsable input is
    /// dropped silently.
    pub fn add_cookie_str(&mut self, fragment: &str) -> &mut Self {
        if let Some(cookie) = Cookie::parse(fragment) {
            self.cookies.insert(cookie);
        }
        self
    }

    pub fn add_cookie(&mut self, cookie: Cookie) -> &mut Self {
        self.cookies.insert(cookie);
        self
    }

    pub fn remove_cookie(&mut self, name: &str) -> &mut Self {
        self.cookies.remove(name);
        self
    }

    pub fn clear_cookies(&mut self) -> &mut Self {
        self.cookies.clear();
        self
    }

    pub fn set_user_agent(&mut self, user_agent: &str) -> &mut Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Ignored unless `secs > 0`.
    pub fn set_timeout(&mut self, secs: u64) -> &mut Self {
        if secs > 0 {
            self.timeout_secs = secs;
        }
        self
    }

    pub fn set_proxy(&mut self, address: &str, username: &str, password: &str) -> &mut Self {
        let address = address.trim();
        self.proxy = (!address.is_empty()).then(|| Proxy {
            address: address.to_string(),
            credentials: (!username.is_empty()).then(|| Credentials {
                username: username.to_string(),
                password: password.to_string(),
            }),
        });
        self
    }

    pub fn set_auth(&mut self, username: &str, password: &str) -> &mut Self {
        self.auth = (!username.is_empty()).then(|| Credentials {
            username: username.to_string(),
            password: password.to_string(),
        });
        self
    }

    /// Switch to a `multipart/<subtype>` POST.
    pub fn submit_multipart(&mut self, subtype: &str) -> &mut Self {
        self.set_method("POST");
        self.multipart = true;
        self.mime_content_type = format!("multipart/{subtype}");
        self
    }

    /// Switch back to an urlencoded submission with the given method.
    pub fn submit_normal(&mut self, method: &str) -> &mut Self {
        self.set_method(method);
        self.multipart = false;
        self.mime_content_type = crate::config::DEFAULT_MIME_TYPE.to_string();
        self
    }

    pub fn set_mime_content_type(&mut self, mime: &str) -> &mut Self {
        self.mime_content_type = mime.to_string();
        self
    }

    pub fn set_boundary(&mut self, boundary: &str) -> &mut Self {
        self.boundary = boundary.to_string();
        self
    }

    /// Enable or disable redirect following. `max` is clamped to at least 1.
    pub fn set_follow_redirect(&mut self, follow: bool, max: Option<u32>) -> &mut Self {
        self.follow_redirects = follow;
        if let Some(max) = max {
            self.max_redirects = max.max(1);
        }
        self
    }

    pub fn set_transport(&mut self, transport: TransportKind) -> &mut Self {
        self.transport = transport;
        self
    }

    pub fn is_post(&self) -> bool {
        self.method == "POST"
    }
}
