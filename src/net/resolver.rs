//! Address resolution.

use std::io;
use std::net::SocketAddr;

use futures_util::future::BoxFuture;
use tokio::net::lookup_host;

/// Turns a host name into an ordered list of candidate addresses.
pub trait Resolve: Send + Sync + 'static {
    /// Resolve `host`, using `default_port` unless the host names its own.
    fn resolve<'a>(
        &'a self,
        host: &'a str,
        default_port: u16,
    ) -> BoxFuture<'a, io::Result<Vec<SocketAddr>>>;
}

/// System resolver backed by `tokio::net::lookup_host`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsResolver;

impl Resolve for DnsResolver {
    fn resolve<'a>(
        &'a self,
        host: &'a str,
        default_port: u16,
    ) -> BoxFuture<'a, io::Result<Vec<SocketAddr>>> {
        Box::pin(async move {
            let (name, port) = split_host_port(host);
            let addrs: Vec<SocketAddr> = lookup_host((name, port.unwrap_or(default_port)))
                .await?
                .collect();
            tracing::trace!(host, count = addrs.len(), "Resolved host");
            Ok(addrs)
        })
    }
}

/// Split an optional explicit port off a host.
///
/// Handles `name`, `name:port`, `[v6]`, `[v6]:port` and bare IPv6 literals.
pub fn split_host_port(host: &str) -> (&str, Option<u16>) {
    if let Some(rest) = host.strip_prefix('[') {
        if let Some((name, tail)) = rest.split_once(']') {
            let port = tail.strip_prefix(':').and_then(|p| p.parse().ok());
            return (name, port);
        }
        return (host, None);
    }

    match host.split_once(':') {
        // More than one colon is an unbracketed IPv6 literal.
        Some((name, port)) if !port.contains(':') => match port.parse() {
            Ok(port) => (name, Some(port)),
            Err(_) => (host, None),
        },
        _ => (host, None),
    }
}
