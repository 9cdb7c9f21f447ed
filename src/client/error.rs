//! Request failure taxonomy.

use std::io;

use thiserror::Error;

/// Why a response could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    /// Status line or headers are not valid HTTP.
    #[error("malformed response head: {0}")]
    Head(#[from] httparse::Error),

    /// Head grew past the configured limit without terminating.
    #[error("response head exceeds {0} bytes")]
    HeadTooLarge(usize),

    #[error("invalid Content-Length header")]
    InvalidContentLength,

    #[error("chunked transfer encoding is not supported")]
    ChunkedEncoding,

    #[error("response body exceeds {0} bytes")]
    BodyTooLarge(usize),

    /// More body bytes arrived than Content-Length announced.
    #[error("response body longer than Content-Length {0}")]
    TrailingData(usize),

    #[error("connection closed before response head was complete")]
    IncompleteHead,

    #[error("connection closed after {received} of {expected} body bytes")]
    TruncatedBody { received: usize, expected: usize },
}

/// Why a request produced no response.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("{host} resolved to no addresses")]
    NoAddresses { host: String },

    /// Every candidate failed to connect, handshake, or answer.
    #[error("all {attempts} candidate addresses failed, last error: {last}")]
    Exhausted {
        attempts: usize,
        #[source]
        last: io::Error,
    },

    /// Candidates ran out after the deadline passed.
    #[error("deadline exceeded after {attempts} connection attempts")]
    DeadlineExceeded { attempts: usize },

    #[error("failed to write request: {0}")]
    Write(#[source] io::Error),

    #[error("invalid response: {0}")]
    Parse(#[from] ParseError),

    /// An override hook claimed the request and reported no response.
    #[error("request intercepted by override without a response")]
    Intercepted,
}
