use std::sync::Arc;
use std::time::Duration;

use bytes::BytesMut;
use rustls::pki_types::ServerName;
use rustls::{ClientConfig, RootCertStore};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_rustls::TlsConnector;

use crate::error::{EngineError, Result};
use crate::http::parser::find_headers_end;
use crate::http::writer::Outbound;
use crate::transport::{RawResponse, Transport};

const BUFFER_SIZE: usize = 8192;

/// Upper bound on a response head before the exchange is abandoned.
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Writes the serialized request to a TCP (or TLS) stream and reads the
/// reply until the server closes the connection.
///
/// Nothing is decompressed; the request never advertises an encoding.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawTransport;

impl Transport for RawTransport {
    async fn send(&self, outbound: &Outbound) -> Result<RawResponse> {
        if outbound.proxy.is_some() {
            tracing::debug!(url = %outbound.target, "raw transport does not use the configured proxy");
        }

        let limit = outbound.timeout;
        let addr = outbound.url.authority();
        let tcp = match timeout(limit, TcpStream::connect(&addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => return Err(EngineError::from_io(&e)),
            Err(_) => return Err(timed_out(limit)),
        };

        tracing::trace!(addr = %addr, tls = outbound.url.tls, "connected");

        let mut request = outbound.header_block();
        request.extend_from_slice(&outbound.body);

        if outbound.url.tls {
            let connector = tls_connector()?;
            let server_name = ServerName::try_from(outbound.url.host.clone())
                .map_err(|e| EngineError::MalformedUrl(format!("{}: {e}", outbound.url.host)))?;
            let stream = match timeout(limit, connector.connect(server_name, tcp)).await {
                Ok(Ok(stream)) => stream,
                Ok(Err(e)) => return Err(EngineError::from_io(&e)),
                Err(_) => return Err(timed_out(limit)),
            };
            exchange(stream, &request, limit).await
        } else {
            exchange(tcp, &request, limit).await
        }
    }
}

fn tls_connector() -> Result<TlsConnector> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .map_err(|e| EngineError::TransportProtocol {
        code: 0,
        message: e.to_string(),
    })?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(TlsConnector::from(Arc::new(config)))
}

/// Write `request`, then read the head and the body to end-of-stream.
///
/// The stream is dropped (closing the connection) on every return path.
async fn exchange<S>(mut stream: S, request: &[u8], limit: Duration) -> Result<RawResponse>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    match timeout(limit, async {
        stream.write_all(request).await?;
        stream.flush().await
    })
    .await
    {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(EngineError::from_io(&e)),
        Err(_) => return Err(timed_out(limit)),
    }

    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);

    let header_len = loop {
        let n = read_some(&mut stream, &mut buffer, limit).await?;
        if let Some(end) = find_headers_end(&buffer) {
            break end + 4;
        }
        if n == 0 {
            // Closed mid-head: everything received counts as head.
            break buffer.len();
        }
        if buffer.len() > MAX_HEAD_SIZE {
            return Err(EngineError::Connection {
                code: 0,
                message: "response headers too large".into(),
            });
        }
    };

    while read_some(&mut stream, &mut buffer, limit).await? > 0 {}

    let _ = stream.shutdown().await;

    tracing::trace!(bytes = buffer.len(), header_len, "raw exchange complete");

    Ok(RawResponse {
        bytes: buffer.to_vec(),
        header_len,
        decoded: false,
    })
}

/// One bounded read. A TLS peer that closes without `close_notify` counts
/// as a clean end-of-stream.
async fn read_some<S>(stream: &mut S, buffer: &mut BytesMut, limit: Duration) -> Result<usize>
where
    S: AsyncRead + Unpin,
{
    buffer.reserve(BUFFER_SIZE);
    match timeout(limit, stream.read_buf(buffer)).await {
        Ok(Ok(n)) => Ok(n),
        Ok(Err(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(0),
        Ok(Err(e)) => Err(EngineError::from_io(&e)),
        Err(_) => Err(timed_out(limit)),
    }
}

fn timed_out(limit: Duration) -> EngineError {
    EngineError::Timeout {
        seconds: limit.as_secs(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn exchange_splits_head_from_body() {
        let (client, mut server) = tokio::io::duplex(1024);

        let server_task = tokio::spawn(async move {
            let mut received = vec![0u8; 64];
            let n = server.read(&mut received).await.unwrap();
            received.truncate(n);
            server
                .write_all(b"HTTP/1.1 200 OK\r\nX-A: 1\r\n\r\nbody")
                .await
                .unwrap();
            received
        });

        let raw = exchange(client, b"GET / HTTP/1.1\r\n\r\n", Duration::from_secs(2))
            .await
            .unwrap();

        assert_eq!(server_task.await.unwrap(), b"GET / HTTP/1.1\r\n\r\n");
        assert_eq!(raw.header_len, 27);
        assert_eq!(&raw.bytes[raw.header_len..], b"body");
        assert!(!raw.decoded);
    }

    #[tokio::test]
    async fn silent_peer_times_out() {
        let (client, _server) = tokio::io::duplex(1024);
        let err = exchange(client, b"GET / HTTP/1.1\r\n\r\n", Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Timeout { .. }));
    }
}
