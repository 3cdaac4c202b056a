//! Error kinds recorded by the request engine.
//!
//! None of these unwind out of [`Client::execute`](crate::client::Client::execute).
//! They are turned into human-readable entries of the client's error list and
//! the call reports failure through its boolean result.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// No target URL was configured before executing.
    #[error("target url must not be empty")]
    EmptyTarget,

    /// The target or a redirect location could not be split into
    /// scheme/host/port/path.
    #[error("malformed url: {0}")]
    MalformedUrl(String),

    /// The socket could not be opened or failed mid-exchange.
    #[error("connection failed ({code}): {message}")]
    Connection { code: i32, message: String },

    /// No response within the configured bound.
    #[error("no response within {seconds}s")]
    Timeout { seconds: u64 },

    /// The native HTTP client reported a failure of its own.
    #[error("transport error ({code}): {message}")]
    TransportProtocol { code: i32, message: String },

    /// No runtime could drive a blocking `execute`.
    #[error("runtime unavailable: {0}")]
    Runtime(String),
}

impl EngineError {
    /// Build a `Connection` error from an I/O failure, keeping the OS error code.
    pub fn from_io(err: &std::io::Error) -> Self {
        EngineError::Connection {
            code: err.raw_os_error().unwrap_or(0),
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
