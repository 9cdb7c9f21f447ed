//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request for (host, default_port)
//!     → resolver.rs (host → ordered candidate addresses)
//!     → connector.rs (candidate → raw endpoint, bounded by the deadline)
//!     → handshake.rs (raw endpoint → request-ready endpoint)
//!     → Hand off to the request engine
//! ```
//!
//! # Design Decisions
//! - Each stage is a trait so tests and embedders can substitute it
//! - Endpoints are boxed `AsyncRead + AsyncWrite`; dropping one closes it
//! - Failures are plain `io::Error`s; the engine decides what is retryable

use tokio::io::{AsyncRead, AsyncWrite};

pub mod connector;
pub mod handshake;
pub mod resolver;

pub use connector::{Connect, TcpConnector};
pub use handshake::{Handshaker, Plaintext};
pub use resolver::{DnsResolver, Resolve};

/// A connected, non-blocking byte stream.
pub trait Endpoint: AsyncRead + AsyncWrite + Send + Unpin {}

impl<T> Endpoint for T where T: AsyncRead + AsyncWrite + Send + Unpin {}

/// An owned endpoint of any concrete type.
pub type BoxedEndpoint = Box<dyn Endpoint>;
