//! Incremental HTTP/1.x response parser.
//!
//! # Responsibilities
//! - Accumulate response bytes across any number of chunks
//! - Parse the status line and headers once the head is complete
//! - Decide whether the response is complete when the peer closes
//!
//! # Design Decisions
//! - Chunk boundaries never affect the result; all state lives in one buffer
//! - Without Content-Length the body runs until EOF
//! - Chunked transfer encoding is rejected rather than passed through raw
//! - Head and body sizes are bounded by [`LimitsConfig`]

use bytes::{Bytes, BytesMut};

use crate::client::error::ParseError;
use crate::client::request::Header;
use crate::client::response::Response;
use crate::config::LimitsConfig;

/// Maximum number of response headers.
pub const MAX_HEADERS: usize = 64;

#[derive(Debug)]
struct Head {
    status: u16,
    headers: Vec<Header>,
    content_length: Option<usize>,
}

#[derive(Debug)]
enum State {
    /// Waiting for the blank line ending the head.
    Head,
    /// Head parsed; everything buffered is body.
    Body(Head),
    /// `finish` was called.
    Finished,
}

/// Accumulates one response.
#[derive(Debug)]
pub struct ResponseParser {
    state: State,
    buf: BytesMut,
    max_head_bytes: usize,
    max_body_bytes: usize,
}

impl ResponseParser {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self {
            state: State::Head,
            buf: BytesMut::new(),
            max_head_bytes: limits.max_head_bytes,
            max_body_bytes: limits.max_body_bytes,
        }
    }

    /// Feed the next chunk of response bytes.
    pub fn parse(&mut self, chunk: &[u8]) -> Result<(), ParseError> {
        self.buf.extend_from_slice(chunk);

        if matches!(self.state, State::Head) && !self.parse_head()? {
            return Ok(());
        }

        if let State::Body(head) = &self.state {
            if let Some(expected) = head.content_length {
                if self.buf.len() > expected {
                    return Err(ParseError::TrailingData(expected));
                }
            }
            if self.buf.len() > self.max_body_bytes {
                return Err(ParseError::BodyTooLarge(self.max_body_bytes));
            }
        }
        Ok(())
    }

    #[cfg(test)]
    fn head_complete(&self) -> bool {
        matches!(self.state, State::Body(_))
    }

    /// Produce the response now that the peer has closed.
    pub fn finish(&mut self) -> Result<Response, ParseError> {
        match std::mem::replace(&mut self.state, State::Finished) {
            State::Head | State::Finished => Err(ParseError::IncompleteHead),
            State::Body(head) => {
                let body: Bytes = self.buf.split().freeze();
                if let Some(expected) = head.content_length {
                    if body.len() < expected {
                        return Err(ParseError::TruncatedBody {
                            received: body.len(),
                            expected,
                        });
                    }
                }
                Ok(Response {
                    status: head.status,
                    headers: head.headers,
                    body,
                })
            }
        }
    }

    /// Try to parse the buffered head. Returns `true` once it is complete.
    fn parse_head(&mut self) -> Result<bool, ParseError> {
        let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut parsed = httparse::Response::new(&mut slots);

        let consumed = match parsed.parse(&self.buf)? {
            httparse::Status::Partial => {
                if self.buf.len() > self.max_head_bytes {
                    return Err(ParseError::HeadTooLarge(self.max_head_bytes));
                }
                return Ok(false);
            }
            httparse::Status::Complete(n) => n,
        };
        if consumed > self.max_head_bytes {
            return Err(ParseError::HeadTooLarge(self.max_head_bytes));
        }

        let status = parsed.code.unwrap_or_default();
        let headers: Vec<Header> = parsed
            .headers
            .iter()
            .map(|h| Header::new(h.name, String::from_utf8_lossy(h.value)))
            .collect();
        let content_length = scan_headers(&headers)?;

        let _ = self.buf.split_to(consumed);
        tracing::trace!(status, header_count = headers.len(), ?content_length, "Response head parsed");

        self.state = State::Body(Head {
            status,
            headers,
            content_length,
        });
        Ok(true)
    }
}

/// Extract the body framing from the headers.
fn scan_headers(headers: &[Header]) -> Result<Option<usize>, ParseError> {
    let mut content_length = None;
    for header in headers {
        if header.key.eq_ignore_ascii_case("transfer-encoding") {
            let chunked = header
                .value
                .split(',')
                .any(|enc| enc.trim().eq_ignore_ascii_case("chunked"));
            if chunked {
                return Err(ParseError::ChunkedEncoding);
            }
        } else if header.key.eq_ignore_ascii_case("content-length") {
            if content_length.is_some() {
                // duplicate
                return Err(ParseError::InvalidContentLength);
            }
            let len = header
                .value
                .trim()
                .parse::<usize>()
                .map_err(|_| ParseError::InvalidContentLength)?;
            content_length = Some(len);
        }
    }
    Ok(content_length)
}
