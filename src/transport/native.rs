use std::error::Error as StdError;

use reqwest::redirect::Policy;

use crate::error::{EngineError, Result};
use crate::http::request::HttpVersion;
use crate::http::writer::Outbound;
use crate::transport::{RawResponse, Transport};

/// Headers the client library computes on its own.
const MANAGED_HEADERS: &[&str] = &["host", "content-length"];

/// Delegates the exchange to `reqwest`.
///
/// Redirects are never followed here, certificates are not verified and
/// gzip/deflate bodies come back decompressed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeTransport;

impl NativeTransport {
    fn client(&self, outbound: &Outbound) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder()
            .redirect(Policy::none())
            .danger_accept_invalid_certs(true)
            .gzip(true)
            .deflate(true)
            .timeout(outbound.timeout)
            .pool_max_idle_per_host(0);

        if let Some(proxy) = &outbound.proxy {
            let mut socks = reqwest::Proxy::all(format!("socks5://{}", proxy.address))
                .map_err(|e| protocol_error(&e))?;
            if let Some(creds) = &proxy.credentials {
                socks = socks.basic_auth(&creds.username, &creds.password);
            }
            builder = builder.proxy(socks);
        }

        builder.build().map_err(|e| protocol_error(&e))
    }
}

impl Transport for NativeTransport {
    async fn send(&self, outbound: &Outbound) -> Result<RawResponse> {
        let client = self.client(outbound)?;
        let method = reqwest::Method::from_bytes(outbound.method.as_bytes())
            .map_err(|e| EngineError::TransportProtocol {
                code: 0,
                message: format!("invalid method {}: {e}", outbound.method),
            })?;

        let version = match outbound.version {
            HttpVersion::Http10 => reqwest::Version::HTTP_10,
            HttpVersion::Http11 => reqwest::Version::HTTP_11,
        };

        let mut request = client.request(method, &outbound.target).version(version);
        for (name, value) in &outbound.headers {
            if MANAGED_HEADERS.iter().any(|m| name.eq_ignore_ascii_case(m)) {
                continue;
            }
            request = request.header(name.as_str(), value.as_str());
        }
        if !outbound.body.is_empty() {
            request = request.body(outbound.body.clone());
        }

        let seconds = outbound.timeout.as_secs();
        let response = request.send().await.map_err(|e| map_error(&e, seconds))?;

        let status = response.status();
        let mut bytes = format!(
            "{:?} {} {}\r\n",
            response.version(),
            status.as_u16(),
            status.canonical_reason().unwrap_or("")
        )
        .into_bytes();
        for (name, value) in response.headers() {
            bytes.extend_from_slice(name.as_str().as_bytes());
            bytes.extend_from_slice(b": ");
            bytes.extend_from_slice(value.as_bytes());
            bytes.extend_from_slice(b"\r\n");
        }
        bytes.extend_from_slice(b"\r\n");
        let header_len = bytes.len();

        let body = response.bytes().await.map_err(|e| map_error(&e, seconds))?;
        bytes.extend_from_slice(&body);

        tracing::trace!(url = %outbound.target, status = status.as_u16(), bytes = bytes.len(), "native exchange complete");

        Ok(RawResponse {
            bytes,
            header_len,
            decoded: true,
        })
    }
}

fn map_error(err: &reqwest::Error, seconds: u64) -> EngineError {
    if err.is_timeout() {
        EngineError::Timeout { seconds }
    } else if err.is_connect() {
        EngineError::Connection {
            code: os_error_code(err),
            message: describe(err),
        }
    } else {
        protocol_error(err)
    }
}

fn protocol_error(err: &reqwest::Error) -> EngineError {
    EngineError::TransportProtocol {
        code: err
            .status()
            .map(|s| i32::from(s.as_u16()))
            .unwrap_or_else(|| os_error_code(err)),
        message: describe(err),
    }
}

/// OS error code of the first I/O error in the source chain.
fn os_error_code(err: &(dyn StdError + 'static)) -> i32 {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io) = e.downcast_ref::<std::io::Error>() {
            return io.raw_os_error().unwrap_or(0);
        }
        current = e.source();
    }
    0
}

fn describe(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(e) = current {
        message.push_str(": ");
        message.push_str(&e.to_string());
        current = e.source();
    }
    message
}
