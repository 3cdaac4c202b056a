//! The request engine.
//!
//! A [`Client`] owns one configurable request, the last response and the
//! error list. `execute` drives a single exchange and, when enabled, follows
//! `Location` headers as described in [`redirect`].
//!
//! ```ignore
//! use mimic::Client;
//!
//! let mut client = Client::new();
//! client
//!     .request_mut()
//!     .set_target("http://example.com/login")
//!     .set_method("POST")
//!     .set_param("user", "alice")
//!     .set_follow_redirect(true, Some(3));
//!
//! if client.execute().await {
//!     println!("{}", client.response().text());
//! } else {
//!     eprintln!("{:?}", client.errors());
//! }
//! ```

pub mod redirect;

use crate::config::ClientConfig;
use crate::error::{EngineError, Result};
use crate::http::location;
use crate::http::parser;
use crate::http::request::RequestSpec;
use crate::http::response::ResponseResult;
use crate::http::writer;
use crate::transport::{self, RawResponse, TransportKind};

use redirect::CycleState;

#[derive(Debug, Clone)]
pub struct Client {
    config: ClientConfig,
    request: RequestSpec,
    response: ResponseResult,
    errors: Vec<String>,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let request = RequestSpec::from_config(&config);
        Self {
            config,
            request,
            response: ResponseResult::default(),
            errors: Vec::new(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn request(&self) -> &RequestSpec {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut RequestSpec {
        &mut self.request
    }

    pub fn response(&self) -> &ResponseResult {
        &self.response
    }

    /// Failure messages in the order they occurred.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn redirect_count(&self) -> u32 {
        self.response.redirects
    }

    /// Back to a freshly constructed state: request, response and errors.
    pub fn reset(&mut self) -> &mut Self {
        self.reset_request();
        self.reset_response();
        self.errors.clear();
        self
    }

    pub fn reset_request(&mut self) -> &mut Self {
        self.request = RequestSpec::from_config(&self.config);
        self
    }

    pub fn reset_response(&mut self) -> &mut Self {
        self.response = ResponseResult::default();
        self
    }

    /// Send the configured request.
    ///
    /// Returns `false` when any failure was recorded in [`Client::errors`].
    /// The response of the last completed exchange stays readable either way.
    pub async fn execute(&mut self) -> bool {
        let mut state = CycleState::Idle;

        loop {
            state = match state {
                CycleState::Idle => {
                    self.reset_response();
                    if self.request.target().is_empty() {
                        self.record(EngineError::EmptyTarget);
                        return false;
                    }
                    CycleState::Sent
                }

                CycleState::Sent => match self.exchange().await {
                    Ok(target) => CycleState::Parsed { target },
                    Err(e) => {
                        self.record(e);
                        return false;
                    }
                },

                CycleState::Parsed { target } => {
                    match redirect::next_location(&self.request, &self.response) {
                        Some(location) => CycleState::Redirecting {
                            location,
                            from: target,
                        },
                        None => CycleState::Done,
                    }
                }

                CycleState::Redirecting { location, from } => {
                    match location::resolve_redirect(&location, &from) {
                        Ok(next) => {
                            self.prepare_hop(&next);
                            CycleState::Sent
                        }
                        Err(e) => {
                            self.record(e);
                            return false;
                        }
                    }
                }

                CycleState::Done => return true,
            };
        }
    }

    /// [`Client::execute`] on a private current-thread runtime.
    ///
    /// Inside an existing tokio runtime nothing is sent; an error is recorded
    /// and `false` returned, since blocking there would stall its workers.
    pub fn execute_blocking(&mut self) -> bool {
        if tokio::runtime::Handle::try_current().is_ok() {
            self.record(EngineError::Runtime(
                "execute_blocking called from within an async runtime, use execute".into(),
            ));
            return false;
        }

        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(self.execute()),
            Err(e) => {
                self.record(EngineError::Runtime(e.to_string()));
                false
            }
        }
    }

    /// One request/response cycle. Returns the URL that was fetched.
    async fn exchange(&mut self) -> Result<String> {
        if self.request.transport == TransportKind::Native {
            writer::inject_multipart_content_type(&mut self.request);
        }

        let outbound = writer::prepare(&self.request)?;

        tracing::debug!(
            method = %outbound.method,
            url = %outbound.target,
            hop = self.response.redirects,
            transport = ?self.request.transport,
            "sending request"
        );

        let raw = transport::dispatch(self.request.transport, &outbound).await?;
        self.absorb(raw);

        tracing::info!(
            status = self.response.status,
            url = %outbound.target,
            bytes = self.response.body.len(),
            "response received"
        );

        Ok(outbound.target)
    }

    fn absorb(&mut self, raw: RawResponse) {
        let (head, body) = parser::split_header_body(&raw.bytes, raw.header_len);
        let head = parser::parse_headers(head);

        let body = if !raw.decoded && parser::is_chunked(&head.headers) {
            parser::decode_chunked(body)
        } else {
            body.to_vec()
        };

        self.response.status = head.status;
        self.response.status_line = head.status_line;
        self.response.headers = head.headers;
        self.response.set_cookie_raw = head.set_cookie_raw;
        self.response.cookies = head.cookies;
        self.response.body = body;
    }

    /// Turn the engine into a plain GET for `next`, carrying cookies and the
    /// redirect policy across.
    fn prepare_hop(&mut self, next: &str) {
        self.response.redirects += 1;

        let carried = std::mem::take(&mut self.request.cookies);
        let follow = self.request.follow_redirects;
        let max = self.request.max_redirects();

        self.request = RequestSpec::from_config(&self.config);
        self.request
            .set_target(next)
            .set_follow_redirect(follow, Some(max));
        self.request.cookies = carried.merged_with(&self.response.cookies);

        self.response.clear_keeping_hops();

        tracing::debug!(url = %next, hop = self.response.redirects, "following redirect");
    }

    fn record(&mut self, err: EngineError) {
        tracing::warn!(error = %err, "request failed");
        self.errors.push(err.to_string());
    }
}
