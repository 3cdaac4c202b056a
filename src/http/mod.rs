//! HTTP/1.x message handling for the client side.
//!
//! # Architecture
//!
//! - **`request`**: the caller-facing request description and its setters
//! - **`writer`**: turns a request into a head, a body and a resolved URL
//! - **`location`**: URL decomposition and redirect target resolution
//! - **`cookie`**: `Set-Cookie` parsing and the cookie jar
//! - **`parser`**: splits a raw response, folds headers, decodes chunked bodies
//! - **`response`**: the decoded result exposed to callers
//!
//! # Message Flow
//!
//! ```text
//!   RequestSpec ──► writer::prepare ──► Outbound ──► transport
//!                                                       │
//!   ResponseResult ◄── parser::parse_headers ◄── raw bytes
//! ```

pub mod cookie;
pub mod location;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
