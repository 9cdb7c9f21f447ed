//! Outbound request description.

use std::sync::Arc;

use crate::net::{Handshaker, Plaintext};

/// HTTP method issued by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub key: String,
    pub value: String,
}

impl Header {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// What to fetch and how to connect for it.
///
/// The engine formats this once up front and never mutates it.
#[derive(Clone)]
pub struct Request {
    /// Target host, optionally with an explicit `:port`.
    pub host: String,
    /// Request target, e.g. `/computeMetadata/v1/token`.
    pub path: String,
    /// Extra headers written after the engine's own.
    pub headers: Vec<Header>,
    /// Handshaker for this request; plaintext when unset.
    pub handshaker: Option<Arc<dyn Handshaker>>,
}

impl Request {
    pub fn new(host: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            path: path.into(),
            headers: Vec::new(),
            handshaker: None,
        }
    }

    /// Append a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Use `handshaker` instead of plaintext.
    pub fn handshaker(mut self, handshaker: Arc<dyn Handshaker>) -> Self {
        self.handshaker = Some(handshaker);
        self
    }

    pub(crate) fn resolved_handshaker(&self) -> Arc<dyn Handshaker> {
        self.handshaker
            .clone()
            .unwrap_or_else(|| Arc::new(Plaintext))
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("host", &self.host)
            .field("path", &self.path)
            .field("headers", &self.headers)
            .field("handshaker", &self.handshaker.as_ref().map(|h| h.name().to_string()))
            .finish()
    }
}
