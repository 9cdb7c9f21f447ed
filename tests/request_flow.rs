//! End-to-end request tests against real TCP mock backends.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rpc_httpcli::client::{ParseError, ResponseCallback};
use rpc_httpcli::{Context, HttpClient, Intercept, Pollset, Request, RequestError, Response};
use tokio::sync::oneshot;
use tokio::time::Instant;

mod common;

use common::StaticResolver;

fn client_for(addrs: Vec<SocketAddr>) -> HttpClient {
    HttpClient::builder()
        .resolver(Arc::new(StaticResolver(addrs)))
        .build()
}

fn deadline() -> Instant {
    Instant::now() + Duration::from_secs(5)
}

#[tokio::test]
async fn test_get_round_trip() {
    let (addr, mut received) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nok").await;
    let client = client_for(vec![addr]);
    let context = Context::new();
    let pollset = Pollset::new();

    let request = Request::new("metadata", "/token").header("Metadata-Flavor", "Google");
    let response = client
        .get_async(&context, &pollset, &request, deadline())
        .await
        .expect("GET should succeed");

    assert_eq!(response.status, 200);
    assert_eq!(&response.body[..], b"ok");

    let sent = String::from_utf8(received.recv().await.unwrap()).unwrap();
    assert!(sent.starts_with("GET /token HTTP/1.1\r\n"), "{}", sent);
    assert!(sent.contains("\r\nHost: metadata\r\n"));
    assert!(sent.contains("\r\nConnection: close\r\n"));
    assert!(sent.contains("\r\nMetadata-Flavor: Google\r\n"));
    assert!(sent.ends_with("\r\n\r\n"));

    assert!(context.is_empty());
    assert_eq!(client.registry().live_count(), 0);
}

#[tokio::test]
async fn test_post_sends_body_once() {
    let (addr, mut received) = common::start_mock_backend(b"HTTP/1.1 201 Created\r\nContent-Length: 0\r\n\r\n").await;
    let client = client_for(vec![addr]);

    let response = client
        .post_async(
            &Context::new(),
            &Pollset::new(),
            &Request::new("api", "/v1/report"),
            b"temperature=21",
            deadline(),
        )
        .await
        .expect("POST should succeed");
    assert_eq!(response.status, 201);
    assert!(response.body.is_empty());

    let sent = String::from_utf8(received.recv().await.unwrap()).unwrap();
    assert!(sent.starts_with("POST /v1/report HTTP/1.1\r\n"));
    assert!(sent.contains("\r\nContent-Type: text/plain\r\n"));
    assert!(sent.contains("\r\nContent-Length: 14\r\n"));
    assert!(sent.ends_with("\r\n\r\ntemperature=21"));
    assert!(received.try_recv().is_err());
}

#[tokio::test]
async fn test_failover_past_refused_and_silent_backends() {
    let refused = common::unused_addr().await;
    let (silent, mut silent_received) = common::start_hangup_backend().await;
    let (good, mut good_received) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\nyes").await;
    let client = client_for(vec![refused, silent, good]);

    let response = client
        .get_async(&Context::new(), &Pollset::new(), &Request::new("svc", "/"), deadline())
        .await
        .expect("third candidate should answer");

    assert_eq!(&response.body[..], b"yes");
    assert!(silent_received.recv().await.is_some());
    assert!(good_received.recv().await.is_some());
}

#[tokio::test]
async fn test_split_reply_is_reassembled() {
    let (addr, _received) = common::start_scripted_backend(
        vec![b"HTTP/1.1 200 OK\r\nContent-Le", b"ngth: 5\r\n\r\nhel", b"lo"],
        Duration::from_millis(20),
    )
    .await;
    let client = client_for(vec![addr]);

    let response = client
        .get_async(&Context::new(), &Pollset::new(), &Request::new("svc", "/"), deadline())
        .await
        .unwrap();
    assert_eq!(&response.body[..], b"hello");
}

#[tokio::test]
async fn test_garbage_reply_does_not_fail_over() {
    let (garbage, _) = common::start_mock_backend(b"SSH-2.0-OpenSSH_9.6\r\n").await;
    let (good, mut good_received) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\n\r\n").await;
    let client = client_for(vec![garbage, good]);

    let result = client
        .get_async(&Context::new(), &Pollset::new(), &Request::new("svc", "/"), deadline())
        .await;

    assert!(matches!(result, Err(RequestError::Parse(ParseError::Head(_)))));
    assert!(good_received.try_recv().is_err());
}

#[tokio::test]
async fn test_truncated_reply_does_not_fail_over() {
    let (short, _) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\nContent-Length: 10\r\n\r\nabc").await;
    let (good, mut good_received) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\n\r\n").await;
    let client = client_for(vec![short, good]);

    let result = client
        .get_async(&Context::new(), &Pollset::new(), &Request::new("svc", "/"), deadline())
        .await;

    assert!(matches!(
        result,
        Err(RequestError::Parse(ParseError::TruncatedBody { received: 3, expected: 10 }))
    ));
    assert!(good_received.try_recv().is_err());
}

#[tokio::test]
async fn test_every_candidate_refused() {
    let client = client_for(vec![common::unused_addr().await, common::unused_addr().await]);

    let result = client
        .get_async(&Context::new(), &Pollset::new(), &Request::new("svc", "/"), deadline())
        .await;

    match result {
        Err(RequestError::Exhausted { attempts, .. }) => assert_eq!(attempts, 2),
        other => panic!("expected exhaustion, got {:?}", other),
    }
}

#[tokio::test]
async fn test_callback_fires_once_and_context_balances() {
    let (addr, _) = common::start_mock_backend(b"HTTP/1.1 204 No Content\r\n\r\n").await;
    let client = client_for(vec![addr]);
    let context = Context::new();
    let pollset = Pollset::new();

    let calls = Arc::new(AtomicUsize::new(0));
    let statuses = Arc::new(Mutex::new(Vec::new()));
    let (tx, rx) = oneshot::channel();
    let (counter, sink) = (Arc::clone(&calls), Arc::clone(&statuses));
    client.get(&context, &pollset, &Request::new("svc", "/"), deadline(), move |response: Option<Response>| {
        counter.fetch_add(1, Ordering::SeqCst);
        sink.lock().unwrap().push(response.map(|r| r.status));
        let _ = tx.send(());
    });
    assert!(context.contains(pollset.id()));

    rx.await.unwrap();
    pollset.wait().await;
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(*statuses.lock().unwrap(), vec![Some(204)]);
    assert!(context.is_empty());
    assert_eq!(client.registry().live_count(), 0);
    context.destroy();
}

#[tokio::test]
async fn test_override_keeps_request_off_the_network() {
    let (addr, mut received) = common::start_mock_backend(b"HTTP/1.1 200 OK\r\n\r\n").await;
    let client = client_for(vec![addr]);
    let hook = |request: &Request, _: Instant, on_response: ResponseCallback| {
        if request.path != "/fake" {
            return Intercept::Declined(on_response);
        }
        on_response(Some(Response {
            status: 299,
            headers: Vec::new(),
            body: bytes::Bytes::from_static(b"canned"),
        }));
        Intercept::Handled
    };
    client.set_override(Some(Arc::new(hook)), None);

    let context = Context::new();
    let pollset = Pollset::new();
    let faked = client
        .get_async(&context, &pollset, &Request::new("svc", "/fake"), deadline())
        .await
        .unwrap();
    assert_eq!(faked.status, 299);
    assert_eq!(&faked.body[..], b"canned");
    assert!(received.try_recv().is_err());

    let real = client
        .get_async(&context, &pollset, &Request::new("svc", "/real"), deadline())
        .await
        .unwrap();
    assert_eq!(real.status, 200);
    assert!(received.recv().await.is_some());
}
