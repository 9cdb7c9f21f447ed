//! Request engine state machine.
//!
//! # States
//! ```text
//! Resolve → Connect → Handshake → Write → Read → Done
//!              ↑          │                  │
//!              └──────────┴──────────────────┘
//!          failover: connect error, handshake error,
//!          or peer closed before sending any byte
//! ```
//!
//! # Design Decisions
//! - One `InFlight` value owns all per-request state; it is moved into a
//!   single future and freed when that future completes
//! - The endpoint travels inside the `Step` it belongs to, so leaving a
//!   stage for any reason closes it
//! - Candidates are tried strictly in resolver order, one at a time, with
//!   no backoff; only the deadline bounds the connect phase
//! - Once a request has been written there is no failover unless the peer
//!   closes without answering; a write error or a parse error is final
//! - Write and read have no deadline of their own; they end when the
//!   endpoint reports EOF or an error

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time::Instant;

use crate::client::error::RequestError;
use crate::client::parser::ResponseParser;
use crate::client::response::Response;
use crate::config::ClientConfig;
use crate::net::{BoxedEndpoint, Connect, Handshaker, Resolve};
use crate::observability::metrics;

/// The stage a request moves to next.
enum Step {
    Resolve,
    /// Try the candidate under the cursor.
    Connect,
    Handshake(BoxedEndpoint),
    Write(BoxedEndpoint),
    Read(BoxedEndpoint),
    Done(Result<Response, RequestError>),
}

impl Step {
    fn name(&self) -> &'static str {
        match self {
            Step::Resolve => "resolve",
            Step::Connect => "connect",
            Step::Handshake(_) => "handshake",
            Step::Write(_) => "write",
            Step::Read(_) => "read",
            Step::Done(_) => "done",
        }
    }
}

/// All mutable state of one outstanding request.
pub(crate) struct InFlight {
    request_text: Bytes,
    parser: ResponseParser,
    addresses: Vec<SocketAddr>,
    next_address: usize,
    host: String,
    deadline: Instant,
    have_read_byte: bool,
    handshaker: Arc<dyn Handshaker>,
    resolver: Arc<dyn Resolve>,
    connector: Arc<dyn Connect>,
    read_buffer_size: usize,
    last_error: Option<io::Error>,
}

impl InFlight {
    pub(crate) fn new(
        request_text: Bytes,
        host: String,
        deadline: Instant,
        handshaker: Arc<dyn Handshaker>,
        resolver: Arc<dyn Resolve>,
        connector: Arc<dyn Connect>,
        config: &ClientConfig,
    ) -> Self {
        Self {
            request_text,
            parser: ResponseParser::new(&config.limits),
            addresses: Vec::new(),
            next_address: 0,
            host,
            deadline,
            have_read_byte: false,
            handshaker,
            resolver,
            connector,
            read_buffer_size: config.read_buffer_size,
            last_error: None,
        }
    }

    /// Drive the request to completion.
    pub(crate) async fn run(mut self) -> Result<Response, RequestError> {
        let mut step = Step::Resolve;
        loop {
            tracing::trace!(step = step.name(), "Entering step");
            step = match step {
                Step::Resolve => self.resolve().await,
                Step::Connect => self.connect_next().await,
                Step::Handshake(raw) => self.handshake(raw).await,
                Step::Write(endpoint) => self.write(endpoint).await,
                Step::Read(endpoint) => self.read(endpoint).await,
                Step::Done(result) => return result,
            };
        }
    }

    async fn resolve(&mut self) -> Step {
        let port = self.handshaker.default_port();
        match self.resolver.resolve(&self.host, port).await {
            Ok(addresses) if addresses.is_empty() => Step::Done(Err(RequestError::NoAddresses {
                host: self.host.clone(),
            })),
            Ok(addresses) => {
                tracing::debug!(candidates = addresses.len(), "Host resolved");
                self.addresses = addresses;
                self.next_address = 0;
                Step::Connect
            }
            Err(source) => Step::Done(Err(RequestError::Resolve {
                host: self.host.clone(),
                source,
            })),
        }
    }

    async fn connect_next(&mut self) -> Step {
        let Some(&addr) = self.addresses.get(self.next_address) else {
            return Step::Done(Err(self.exhausted()));
        };
        self.next_address += 1;
        self.have_read_byte = false;

        match self.connector.connect(addr, self.deadline).await {
            Ok(raw) => Step::Handshake(raw),
            Err(e) => self.failover("connect", e),
        }
    }

    async fn handshake(&mut self, raw: BoxedEndpoint) -> Step {
        match self.handshaker.handshake(raw, &self.host).await {
            Ok(endpoint) => Step::Write(endpoint),
            Err(e) => self.failover("handshake", e),
        }
    }

    async fn write(&mut self, mut endpoint: BoxedEndpoint) -> Step {
        let request_text = self.request_text.clone();
        match write_request(&mut endpoint, &request_text).await {
            Ok(()) => {
                tracing::trace!(bytes = request_text.len(), "Request written");
                Step::Read(endpoint)
            }
            Err(e) => Step::Done(Err(RequestError::Write(e))),
        }
    }

    async fn read(&mut self, mut endpoint: BoxedEndpoint) -> Step {
        let mut chunk = BytesMut::with_capacity(self.read_buffer_size);
        loop {
            chunk.clear();
            match endpoint.read_buf(&mut chunk).await {
                Ok(0) => return self.on_closed(None),
                Ok(_) => {
                    self.have_read_byte = true;
                    if let Err(e) = self.parser.parse(&chunk) {
                        return Step::Done(Err(e.into()));
                    }
                }
                Err(e) => return self.on_closed(Some(e)),
            }
        }
    }

    /// The peer closed the connection or the read failed.
    fn on_closed(&mut self, error: Option<io::Error>) -> Step {
        if !self.have_read_byte {
            let error = error.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before any response bytes",
                )
            });
            return self.failover("read", error);
        }
        if let Some(e) = error {
            tracing::debug!(error = %e, "Read failed after response bytes arrived");
        }
        Step::Done(self.parser.finish().map_err(RequestError::from))
    }

    /// Abandon the current candidate and move on to the next.
    fn failover(&mut self, stage: &'static str, error: io::Error) -> Step {
        let candidate = self.addresses.get(self.next_address.wrapping_sub(1)).copied();
        tracing::debug!(
            stage,
            candidate = ?candidate,
            remaining = self.addresses.len().saturating_sub(self.next_address),
            error = %error,
            "Candidate failed, trying next address"
        );
        metrics::record_failover(stage);
        self.last_error = Some(error);
        Step::Connect
    }

    fn exhausted(&mut self) -> RequestError {
        let attempts = self.addresses.len();
        if Instant::now() >= self.deadline {
            return RequestError::DeadlineExceeded { attempts };
        }
        let last = self
            .last_error
            .take()
            .unwrap_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no candidate attempted"));
        RequestError::Exhausted { attempts, last }
    }
}

async fn write_request(endpoint: &mut BoxedEndpoint, request_text: &[u8]) -> io::Result<()> {
    endpoint.write_all(request_text).await?;
    endpoint.flush().await
}
