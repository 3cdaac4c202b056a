//! Cookie records and the per-client cookie jar.
//!
//! Domain matching is deliberately coarse: a cookie's `Domain` attribute is
//! compared against the last two labels of the request host, not against a
//! public-suffix list.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub expires: Option<DateTime<Utc>>,
    pub path: Option<String>,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            expires: None,
            path: None,
            domain: None,
            secure: false,
            http_only: false,
        }
    }

    /// Parse a `Set-Cookie` value such as `sid=abc; Path=/; HttpOnly`.
    ///
    /// Returns `None` for anything without a `name=value` leading pair.
    pub fn parse(fragment: &str) -> Option<Self> {
        let mut parts = fragment.split(';');
        let (name, value) = parts.next()?.trim().split_once('=')?;
        let name = name.trim();
        if name.is_empty() || name.contains(char::is_whitespace) {
            return None;
        }

        let mut cookie = Cookie::new(name, value.trim());
        let mut max_age = None;

        for attr in parts {
            let attr = attr.trim();
            if attr.is_empty() {
                continue;
            }
            let (key, val) = match attr.split_once('=') {
                Some((k, v)) => (k.trim(), v.trim()),
                None => (attr, ""),
            };

            match key.to_ascii_lowercase().as_str() {
                "expires" => cookie.expires = parse_expires(val),
                "max-age" => max_age = val.parse::<i64>().ok(),
                "path" if !val.is_empty() => cookie.path = Some(val.to_string()),
                "domain" if !val.is_empty() => cookie.domain = Some(val.to_string()),
                "secure" => cookie.secure = true,
                "httponly" => cookie.http_only = true,
                _ => {}
            }
        }

        // Max-Age wins over Expires when both are present.
        if let Some(secs) = max_age {
            cookie.expires = if secs <= 0 {
                Some(DateTime::<Utc>::UNIX_EPOCH)
            } else {
                TimeDelta::try_seconds(secs).and_then(|d| Utc::now().checked_add_signed(d))
            };
        }

        Some(cookie)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires.is_some_and(|at| at < now)
    }

    /// Whether this cookie may be sent to `host`.
    ///
    /// Cookies without a domain attribute apply everywhere.
    pub fn applies_to(&self, host: &str) -> bool {
        match self.domain.as_deref().map(|d| d.trim_matches('.')) {
            None | Some("") => true,
            Some(domain) => domain.eq_ignore_ascii_case(base_domain(host)),
        }
    }
}

/// Last two dot-separated labels of `host`.
pub fn base_domain(host: &str) -> &str {
    let host = host.trim_end_matches('.');
    match host.rmatch_indices('.').nth(1) {
        Some((idx, _)) => &host[idx + 1..],
        None => host,
    }
}

fn parse_expires(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }
    ["%a, %d-%b-%Y %H:%M:%S GMT", "%a, %d-%b-%y %H:%M:%S GMT"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Cookies keyed by name, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: Vec<Cookie>,
}

impl CookieJar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the cookie with the same name.
    pub fn insert(&mut self, cookie: Cookie) {
        match self.cookies.iter_mut().find(|c| c.name == cookie.name) {
            Some(existing) => *existing = cookie,
            None => self.cookies.push(cookie),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.iter().find(|c| c.name == name)
    }

    pub fn remove(&mut self, name: &str) -> Option<Cookie> {
        let idx = self.cookies.iter().position(|c| c.name == name)?;
        Some(self.cookies.remove(idx))
    }

    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.cookies.iter()
    }

    /// Combine two jars. Entries of `preferred` win over entries of `self`
    /// that share a name.
    pub fn merged_with(&self, preferred: &CookieJar) -> CookieJar {
        let mut out = preferred.clone();
        for cookie in &self.cookies {
            if out.get(&cookie.name).is_none() {
                out.cookies.push(cookie.clone());
            }
        }
        out
    }

    /// `Cookie` header value for `host`, or `None` when nothing applies.
    pub fn header_value(&self, host: &str) -> Option<String> {
        self.header_value_at(host, Utc::now())
    }

    pub fn header_value_at(&self, host: &str, now: DateTime<Utc>) -> Option<String> {
        let value = self
            .cookies
            .iter()
            .filter(|c| c.applies_to(host) && !c.is_expired_at(now))
            .map(|c| format!("{}={};", c.name, c.value))
            .collect::<Vec<_>>()
            .join(" ");

        (!value.is_empty()).then_some(value)
    }
}

impl FromIterator<Cookie> for CookieJar {
    fn from_iter<I: IntoIterator<Item = Cookie>>(iter: I) -> Self {
        let mut jar = CookieJar::new();
        for cookie in iter {
            jar.insert(cookie);
        }
        jar
    }
}
