//! Redirect-following states and the decision taken after each response.
//!
//! ```text
//!   Idle ──► Sent ──► Parsed ──► Done
//!             ▲          │
//!             │          ▼
//!             └──── Redirecting
//! ```
//!
//! A hop replays the new location as a fresh default request: method,
//! parameters, headers and body are dropped, cookies and the redirect
//! policy are carried over.

use crate::http::request::RequestSpec;
use crate::http::response::ResponseResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum CycleState {
    Idle,
    /// A request is in flight.
    Sent,
    /// A response was decoded; `target` is the URL it was fetched from.
    Parsed { target: String },
    Redirecting { location: String, from: String },
    Done,
}

/// `Location` to follow next, if the policy and hop budget allow it.
pub fn next_location(spec: &RequestSpec, response: &ResponseResult) -> Option<String> {
    if !spec.follow_redirects || response.redirects() >= spec.max_redirects() {
        return None;
    }
    response
        .header_first("location")
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
}
