//! Shared mock servers and helpers for integration testing.

#![allow(dead_code)]

use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use futures_util::future::BoxFuture;
use rpc_httpcli::net::Resolve;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Resolver that returns the same candidates for every host.
pub struct StaticResolver(pub Vec<SocketAddr>);

impl Resolve for StaticResolver {
    fn resolve<'a>(&'a self, _host: &'a str, _port: u16) -> BoxFuture<'a, io::Result<Vec<SocketAddr>>> {
        let addrs = self.0.clone();
        Box::pin(async move { Ok(addrs) })
    }
}

/// An address nothing is listening on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Start a mock backend that answers every connection with `chunks`,
/// pausing `gap` between them, then closes.
///
/// Each received request is forwarded on the returned channel.
pub async fn start_scripted_backend(
    chunks: Vec<&'static [u8]>,
    gap: Duration,
) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let tx = tx.clone();
                    let chunks = chunks.clone();
                    tokio::spawn(async move {
                        let request = read_request(&mut socket).await;
                        let _ = tx.send(request);
                        for (i, chunk) in chunks.iter().enumerate() {
                            if i > 0 {
                                tokio::time::sleep(gap).await;
                            }
                            if socket.write_all(chunk).await.is_err() {
                                return;
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, rx)
}

/// Start a mock backend that replies with `response` in one write.
pub async fn start_mock_backend(response: &'static [u8]) -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    start_scripted_backend(vec![response], Duration::ZERO).await
}

/// Start a backend that reads the request and closes without answering.
pub async fn start_hangup_backend() -> (SocketAddr, mpsc::UnboundedReceiver<Vec<u8>>) {
    start_scripted_backend(Vec::new(), Duration::ZERO).await
}

/// Read one request: the head, then `Content-Length` body bytes.
async fn read_request(socket: &mut TcpStream) -> Vec<u8> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(head_end) = find(&buf, b"\r\n\r\n") {
            let expected = head_end + 4 + content_length(&buf[..head_end]);
            if buf.len() >= expected {
                return buf;
            }
        }
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return buf,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn content_length(head: &[u8]) -> usize {
    String::from_utf8_lossy(head)
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
        .unwrap_or(0)
}
