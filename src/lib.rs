//! Mimic - browser-emulating HTTP client
//!
//! Builds requests the way a desktop browser sends them, posts forms and
//! multipart uploads, keeps cookies across redirects and hands back the
//! decoded response.

pub mod client;
pub mod config;
pub mod error;
pub mod files;
pub mod http;
pub mod transport;

pub use client::Client;
pub use config::ClientConfig;
pub use error::EngineError;
pub use http::request::{HttpVersion, RequestSpec};
pub use http::response::{HeaderValue, ResponseResult};
pub use transport::TransportKind;
