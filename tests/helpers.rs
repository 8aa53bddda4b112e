// Shared test helpers: scripted plain and TLS servers on loopback.
//
// Each server accepts exactly one connection, reads the request head, writes
// a canned response and closes. The join handle yields the request bytes.

use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_rustls::TlsAcceptor;

#[allow(dead_code)] // Used by other test files
pub const CA_DER: &[u8] = include_bytes!("fixtures/ca.der");
pub const LEAF_DER: &[u8] = include_bytes!("fixtures/leaf.der");
pub const LEAF_KEY_DER: &[u8] = include_bytes!("fixtures/leaf.key.der");

/// Reads until the blank line ending the request head.
pub async fn read_request<S>(stream: &mut S) -> Vec<u8>
where
    S: AsyncRead + Unpin,
{
    let mut request = Vec::new();
    let mut chunk = [0u8; 512];
    while !request.ends_with(b"\r\n\r\n") {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => request.extend_from_slice(&chunk[..n]),
        }
    }
    request
}

async fn respond<S>(stream: &mut S, response: &[u8]) -> Vec<u8>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let request = read_request(stream).await;
    // The client may hang up early (e.g. after a redirect); that is fine here
    let _ = stream.write_all(response).await;
    let _ = stream.shutdown().await;
    request
}

/// Starts a plain server that answers one request with `response`.
#[allow(dead_code)] // Used by other test files
pub async fn serve_plain(response: Vec<u8>) -> (u16, JoinHandle<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local address").port();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Accept failed");
        respond(&mut socket, &response).await
    });
    (port, handle)
}

/// TLS acceptor presenting the `localhost` / `127.0.0.1` leaf certificate
/// issued by the test CA.
#[allow(dead_code)] // Used by other test files
pub fn tls_acceptor() -> TlsAcceptor {
    let cert = CertificateDer::from(LEAF_DER.to_vec());
    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(LEAF_KEY_DER.to_vec()));
    let config = rustls::ServerConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()
    .expect("Default protocol versions unsupported")
    .with_no_client_auth()
    .with_single_cert(vec![cert], key)
    .expect("Invalid test certificate or key");
    TlsAcceptor::from(Arc::new(config))
}

/// Starts a TLS server that answers one request with `response`.
///
/// The join handle yields `None` if the client aborted the handshake.
#[allow(dead_code)] // Used by other test files
pub async fn serve_tls(response: Vec<u8>) -> (u16, JoinHandle<Option<Vec<u8>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let port = listener.local_addr().expect("No local address").port();
    let acceptor = tls_acceptor();
    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.expect("Accept failed");
        let mut stream = acceptor.accept(socket).await.ok()?;
        Some(respond(&mut stream, &response).await)
    });
    (port, handle)
}
