//! Asynchronous HTTP/1.1 client for metadata and control-plane calls.
//!
//! Issues one-shot GET and POST requests over pluggable byte streams
//! without blocking a thread. Each request resolves its host, tries the
//! candidate addresses in order, runs a handshake, writes the request once
//! and parses the response incrementally until the peer closes.

// Request engine
pub mod client;
pub mod net;
pub mod poll;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use client::{
    Header, HttpClient, HttpClientBuilder, Intercept, Method, Overrides, Request, RequestError,
    Response, ResponseCallback,
};
pub use config::{ClientConfig, HttpCliConfig};
pub use poll::{Context, Pollset};
