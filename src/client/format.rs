//! Request serialization.
//!
//! Produces the full HTTP/1.1 request head (and body for POST) as one
//! immutable buffer. Every write attempt shares it by cheap clone.

use bytes::{BufMut, Bytes, BytesMut};

use crate::client::request::{Method, Request};

/// Serialize a GET request.
pub fn format_get_request(request: &Request, user_agent: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(256);
    write_head(&mut buf, Method::Get, request, user_agent);
    buf.put_slice(b"\r\n");
    buf.freeze()
}

/// Serialize a POST request carrying `body`.
pub fn format_post_request(request: &Request, body: &[u8], user_agent: &str) -> Bytes {
    let mut buf = BytesMut::with_capacity(256 + body.len());
    write_head(&mut buf, Method::Post, request, user_agent);

    if !body.is_empty() {
        let has_content_type = request
            .headers
            .iter()
            .any(|h| h.key.eq_ignore_ascii_case("content-type"));
        if !has_content_type {
            put_header(&mut buf, "Content-Type", "text/plain");
        }
    }
    put_header(&mut buf, "Content-Length", &body.len().to_string());
    buf.put_slice(b"\r\n");
    buf.put_slice(body);
    buf.freeze()
}

fn write_head(buf: &mut BytesMut, method: Method, request: &Request, user_agent: &str) {
    buf.put_slice(method.as_str().as_bytes());
    buf.put_u8(b' ');
    buf.put_slice(request.path.as_bytes());
    buf.put_slice(b" HTTP/1.1\r\n");

    put_header(buf, "Host", &request.host);
    put_header(buf, "Connection", "close");
    put_header(buf, "User-Agent", user_agent);
    for header in &request.headers {
        put_header(buf, &header.key, &header.value);
    }
}

fn put_header(buf: &mut BytesMut, key: &str, value: &str) {
    buf.put_slice(key.as_bytes());
    buf.put_slice(b": ");
    buf.put_slice(value.as_bytes());
    buf.put_slice(b"\r\n");
}
