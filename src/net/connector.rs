//! Outbound connection establishment.

use std::io;
use std::net::SocketAddr;

use futures_util::future::BoxFuture;
use tokio::net::TcpStream;
use tokio::time::{timeout_at, Instant};

use crate::net::BoxedEndpoint;

/// Connects to a single candidate address.
pub trait Connect: Send + Sync + 'static {
    /// Connect to `addr`, failing with `TimedOut` once `deadline` passes.
    fn connect(&self, addr: SocketAddr, deadline: Instant) -> BoxFuture<'_, io::Result<BoxedEndpoint>>;
}

/// Plain TCP connector.
#[derive(Debug, Clone, Copy)]
pub struct TcpConnector {
    nodelay: bool,
}

impl TcpConnector {
    pub fn new(nodelay: bool) -> Self {
        Self { nodelay }
    }
}

impl Default for TcpConnector {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Connect for TcpConnector {
    fn connect(&self, addr: SocketAddr, deadline: Instant) -> BoxFuture<'_, io::Result<BoxedEndpoint>> {
        Box::pin(async move {
            let stream = match timeout_at(deadline, TcpStream::connect(addr)).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect to {} exceeded deadline", addr),
                    ))
                }
            };
            stream.set_nodelay(self.nodelay)?;

            tracing::trace!(peer_addr = %addr, "Connected");
            Ok(Box::new(stream) as BoxedEndpoint)
        })
    }
}
