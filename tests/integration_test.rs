//! Integration tests for the wire_fetch library over plain TCP.
//!
//! These tests drive `HttpClient` through its public API against scripted
//! loopback servers. They do not make real network requests, except the
//! resolution failure test, which only needs the resolver to say "no".

mod helpers;

use std::time::Duration;

use helpers::serve_plain;
use wire_fetch::{
    init_resolver, ClientConfig, ClientEvent, ErrorKind, HttpClient, Outcome, StreamEnd,
    TransportMode,
};

fn plain_config(port: u16, path: &str) -> ClientConfig {
    ClientConfig::new("127.0.0.1", port, path, TransportMode::Plain)
}

fn response_with_body(body: &[u8]) -> Vec<u8> {
    let mut response = b"HTTP/1.0 200 OK\r\nContent-Type: application/octet-stream\r\n\r\n".to_vec();
    response.extend_from_slice(body);
    response
}

#[tokio::test]
async fn test_large_body_through_small_pipe_arrives_intact() {
    let body: Vec<u8> = (0..300_000u32).map(|i| (i % 253) as u8).collect();
    let (port, _server) = serve_plain(response_with_body(&body)).await;

    let mut config = plain_config(port, "/big");
    config.body_pipe_capacity = 4096;
    let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();

    let Some(ClientEvent::Response(mut response)) = events.recv().await else {
        panic!("expected a response event");
    };
    assert_eq!(response.status_code, 200);
    assert_eq!(response.header("content-type"), Some("application/octet-stream"));
    let received = response.body.read_to_end().await;

    assert_eq!(received.len(), body.len());
    assert!(received == body, "body bytes differ");
    match task.await.unwrap() {
        Outcome::Delivered(summary) => {
            assert_eq!(summary.end, StreamEnd::Eof);
            assert_eq!(summary.bytes, body.len() as u64);
        }
        other => panic!("expected delivered outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_consumer_receives_every_byte_in_order() {
    let body: Vec<u8> = (0..32_768u32).map(|i| (i % 97) as u8).collect();
    let (port, _server) = serve_plain(response_with_body(&body)).await;

    let mut config = plain_config(port, "/");
    config.body_pipe_capacity = 512;
    let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();

    let Some(ClientEvent::Response(mut response)) = events.recv().await else {
        panic!("expected a response event");
    };
    let mut received = Vec::new();
    let mut chunk = [0u8; 300];
    loop {
        let n = response.body.read(&mut chunk).await;
        if n == 0 {
            break;
        }
        received.extend_from_slice(&chunk[..n]);
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    assert!(received == body, "body bytes differ");
    assert!(matches!(task.await.unwrap(), Outcome::Delivered(s) if s.end == StreamEnd::Eof));
}

#[tokio::test]
async fn test_request_target_is_sent_verbatim() {
    let (port, server) = serve_plain(response_with_body(b"")).await;

    let config = ClientConfig::from_url(&format!("http://127.0.0.1:{port}/a/b?c=d&e")).unwrap();
    let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();
    assert!(matches!(events.recv().await, Some(ClientEvent::Response(_))));
    task.await.unwrap();

    let request = server.await.unwrap();
    assert_eq!(
        String::from_utf8(request).unwrap(),
        "GET /a/b?c=d&e HTTP/1.0\r\nHost: 127.0.0.1\r\nAccept: */*\r\nConnection: close\r\n\r\n"
    );
}

#[tokio::test]
async fn test_caller_follows_redirect_with_new_client() {
    let (final_port, _final_server) = serve_plain(response_with_body(b"arrived")).await;
    let location = format!("http://127.0.0.1:{final_port}/final");
    let (first_port, _first_server) = serve_plain(
        format!("HTTP/1.1 301 Moved Permanently\r\nLocation: {location}\r\n\r\n").into_bytes(),
    )
    .await;

    let resolver = init_resolver();
    let (task, mut events) = HttpClient::new(plain_config(first_port, "/start"), resolver.clone()).spawn();
    let Some(ClientEvent::Redirect(next)) = events.recv().await else {
        panic!("expected a redirect event");
    };
    assert_eq!(next, location);
    assert_eq!(task.await.unwrap(), Outcome::Redirected(location.clone()));

    let config = ClientConfig::from_url(&next).unwrap();
    let (task, mut events) = HttpClient::new(config, resolver).spawn();
    let Some(ClientEvent::Response(mut response)) = events.recv().await else {
        panic!("expected a response event");
    };
    assert_eq!(response.status_line, "HTTP/1.0 200OK");
    assert_eq!(response.body.read_to_end().await, b"arrived");
    task.await.unwrap();
}

#[tokio::test]
async fn test_peer_closing_without_reply_is_malformed_status_line() {
    let (port, _server) = serve_plain(Vec::new()).await;

    let (task, mut events) = HttpClient::new(plain_config(port, "/"), init_resolver()).spawn();

    match events.recv().await {
        Some(ClientEvent::Failure(err)) => assert_eq!(err.kind(), ErrorKind::MalformedStatusLine),
        other => panic!("expected a failure event, got {other:?}"),
    }
    assert_eq!(
        task.await.unwrap(),
        Outcome::Failed(ErrorKind::MalformedStatusLine)
    );
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_oversized_header_block_is_rejected() {
    let mut response = b"HTTP/1.0 200 OK\r\n".to_vec();
    for i in 0..64 {
        response.extend_from_slice(format!("X-Padding-{i}: {}\r\n", "p".repeat(100)).as_bytes());
    }
    response.extend_from_slice(b"\r\nbody");
    let (port, _server) = serve_plain(response).await;

    let mut config = plain_config(port, "/");
    config.max_header_bytes = 1024;
    let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();

    assert!(matches!(events.recv().await, Some(ClientEvent::Failure(_))));
    assert_eq!(
        task.await.unwrap(),
        Outcome::Failed(ErrorKind::MalformedHeaderBlock)
    );
}

#[tokio::test]
async fn test_unresolvable_host_fails_in_resolution() {
    let config = ClientConfig::new(
        "definitely-does-not-exist-12345.invalid",
        80,
        "/",
        TransportMode::Plain,
    );
    let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();

    match events.recv().await {
        Some(ClientEvent::Failure(err)) => {
            assert_eq!(err.kind(), ErrorKind::ResolutionError);
            assert!(err.kind().is_network());
        }
        other => panic!("expected a failure event, got {other:?}"),
    }
    assert_eq!(task.await.unwrap(), Outcome::Failed(ErrorKind::ResolutionError));
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn test_concurrent_clients_share_one_resolver() {
    let resolver = init_resolver();
    let mut tasks = Vec::new();
    for i in 0..8u8 {
        let (port, _server) = serve_plain(response_with_body(&[i; 100])).await;
        let client = HttpClient::new(plain_config(port, "/"), resolver.clone());
        tasks.push(tokio::spawn(async move {
            let (task, mut events) = client.spawn();
            let Some(ClientEvent::Response(mut response)) = events.recv().await else {
                panic!("expected a response event");
            };
            let body = response.body.read_to_end().await;
            task.await.unwrap();
            (i, body)
        }));
    }

    for task in tasks {
        let (i, body) = task.await.unwrap();
        assert_eq!(body, vec![i; 100]);
    }
}
