//! Send/receive strategies.
//!
//! Both strategies take a composed [`Outbound`] message and hand back the
//! raw response bytes together with the length of the response head. Each
//! call opens its own connection and releases it before returning.

pub mod native;
pub mod raw;

use std::future::Future;

use serde::Deserialize;

use crate::error::Result;
use crate::http::writer::Outbound;

pub use native::NativeTransport;
pub use raw::RawTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Pooling HTTP client (`reqwest`).
    Native,
    /// Plain byte stream with manual framing.
    Raw,
}

impl TransportKind {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "native" => Some(TransportKind::Native),
            "raw" => Some(TransportKind::Raw),
            _ => None,
        }
    }
}

/// Bytes received for one exchange.
#[derive(Debug, Clone, Default)]
pub struct RawResponse {
    pub bytes: Vec<u8>,
    /// Length of the status line and headers, terminator included.
    pub header_len: usize,
    /// The transport already removed transfer/content codings from the body.
    pub decoded: bool,
}

pub trait Transport {
    fn send(&self, outbound: &Outbound) -> impl Future<Output = Result<RawResponse>> + Send;
}

pub async fn dispatch(kind: TransportKind, outbound: &Outbound) -> Result<RawResponse> {
    match kind {
        TransportKind::Native => NativeTransport.send(outbound).await,
        TransportKind::Raw => RawTransport.send(outbound).await,
    }
}
