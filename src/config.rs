use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use crate::http::request::HttpVersion;
use crate::transport::TransportKind;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:128.0) Gecko/20100101 Firefox/128.0";
pub const DEFAULT_BOUNDARY: &str = "mimic.boundary";
pub const DEFAULT_MIME_TYPE: &str = "application/x-www-form-urlencoded";

/// Defaults applied every time a request is (re)built.
///
/// A redirect hop starts from these values again, so anything that should
/// survive a hop belongs here rather than on the request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub user_agent: String,
    pub boundary: String,
    pub mime_content_type: String,
    pub timeout_secs: u64,
    pub http_version: HttpVersion,
    pub follow_redirects: bool,
    pub max_redirects: u32,
    pub transport: TransportKind,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            boundary: DEFAULT_BOUNDARY.to_string(),
            mime_content_type: DEFAULT_MIME_TYPE.to_string(),
            timeout_secs: 10,
            http_version: HttpVersion::Http11,
            follow_redirects: false,
            max_redirects: 3,
            transport: TransportKind::Raw,
        }
    }
}

impl ClientConfig {
    /// Defaults overridden by `MIMIC_*` environment variables.
    ///
    /// Values that fail to parse are ignored.
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(ua) = std::env::var("MIMIC_USER_AGENT") {
            cfg.user_agent = ua;
        }
        if let Ok(boundary) = std::env::var("MIMIC_BOUNDARY") {
            if !boundary.trim().is_empty() {
                cfg.boundary = boundary.trim().to_string();
            }
        }
        if let Some(secs) = env_parse::<u64>("MIMIC_TIMEOUT").filter(|s| *s > 0) {
            cfg.timeout_secs = secs;
        }
        if let Some(max) = env_parse::<u32>("MIMIC_MAX_REDIRECTS") {
            cfg.max_redirects = max.max(1);
        }
        if let Some(follow) = env_parse::<bool>("MIMIC_FOLLOW_REDIRECTS") {
            cfg.follow_redirects = follow;
        }
        if let Some(version) = std::env::var("MIMIC_HTTP_VERSION")
            .ok()
            .and_then(|v| HttpVersion::parse(&v))
        {
            cfg.http_version = version;
        }
        if let Some(kind) = std::env::var("MIMIC_TRANSPORT")
            .ok()
            .and_then(|v| TransportKind::from_name(&v))
        {
            cfg.transport = kind;
        }

        cfg
    }

    pub fn from_yaml_str(source: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(source).context("invalid client configuration")
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&source)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}
