//! Connection handshakers.
//!
//! A handshaker turns a freshly connected endpoint into one that is ready
//! for the request to be written: the identity for plaintext, an
//! encryption negotiation for secure variants. It runs exactly once per
//! connection attempt that gets this far. An error is treated like a
//! failed connect and the engine moves on to the next candidate address.

use std::io;

use futures_util::future::{self, BoxFuture};

use crate::net::BoxedEndpoint;

/// A pluggable transform applied to every new connection.
pub trait Handshaker: Send + Sync + 'static {
    /// Short name used in logs, e.g. `"http"`.
    fn name(&self) -> &str;

    /// Port used when the request host does not name one.
    fn default_port(&self) -> u16;

    /// Prepare `endpoint` for talking to `host`.
    fn handshake<'a>(
        &'a self,
        endpoint: BoxedEndpoint,
        host: &'a str,
    ) -> BoxFuture<'a, io::Result<BoxedEndpoint>>;
}

/// Passthrough handshaker for unencrypted HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plaintext;

impl Handshaker for Plaintext {
    fn name(&self) -> &str {
        "http"
    }

    fn default_port(&self) -> u16 {
        80
    }

    fn handshake<'a>(
        &'a self,
        endpoint: BoxedEndpoint,
        _host: &'a str,
    ) -> BoxFuture<'a, io::Result<BoxedEndpoint>> {
        Box::pin(future::ready(Ok(endpoint)))
    }
}
