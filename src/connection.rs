//! Connection establishment.
//!
//! Resolves the target host, connects to the first endpoint that accepts,
//! and optionally runs the TLS handshake. Plain and TLS sockets are unified
//! behind `Transport`, so everything after the handshake is written once.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use hickory_resolver::TokioAsyncResolver;
use log::{debug, info};
use rustls::pki_types::ServerName;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

use crate::config::{ClientConfig, TransportMode};
use crate::error_handling::ClientError;
use crate::fetch::State;
use crate::tls::{build_client_config, TrustContext};
use crate::utils::with_deadline;

/// Byte stream to the peer, plain or TLS-wrapped.
#[derive(Debug)]
pub enum Transport {
    Plain(TcpStream),
    Tls(Box<TlsStream<TcpStream>>),
}

impl Transport {
    pub fn is_tls(&self) -> bool {
        matches!(self, Transport::Tls(_))
    }
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_read(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_write(cx, buf),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_flush(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Transport::Plain(stream) => Pin::new(stream).poll_shutdown(cx),
            Transport::Tls(stream) => Pin::new(stream.as_mut()).poll_shutdown(cx),
        }
    }
}

/// An established transport and the endpoint it is connected to.
#[derive(Debug)]
pub struct Connection {
    transport: Transport,
    peer: SocketAddr,
}

impl Connection {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    pub fn transport_mut(&mut self) -> &mut Transport {
        &mut self.transport
    }
}

/// Runs resolve, connect and (for TLS) handshake for `config`, advancing
/// `state` as each phase starts.
///
/// # Errors
///
/// Returns the error of the first phase that fails. Nothing is retried.
pub async fn establish(
    resolver: &TokioAsyncResolver,
    config: &ClientConfig,
    state: &mut State,
) -> Result<Connection, ClientError> {
    state.advance(State::Resolving);
    let endpoints = resolve(resolver, &config.host, config.port).await?;

    state.advance(State::Connecting);
    let (tcp, peer) = connect(&endpoints, config).await?;

    let transport = match &config.transport {
        TransportMode::Plain => Transport::Plain(tcp),
        TransportMode::Tls(trust) => {
            state.advance(State::Handshaking);
            handshake(tcp, &config.host, trust, config).await?
        }
    };
    Ok(Connection { transport, peer })
}

/// Resolves `host` to candidate endpoints on `port`, in resolver order.
pub async fn resolve(
    resolver: &TokioAsyncResolver,
    host: &str,
    port: u16,
) -> Result<Vec<SocketAddr>, ClientError> {
    let lookup = resolver
        .lookup_ip(host)
        .await
        .map_err(|e| ClientError::Resolution {
            host: host.to_string(),
            message: e.to_string(),
        })?;

    let endpoints: Vec<SocketAddr> = lookup.iter().map(|ip| SocketAddr::new(ip, port)).collect();
    if endpoints.is_empty() {
        return Err(ClientError::Resolution {
            host: host.to_string(),
            message: "No IP addresses found".to_string(),
        });
    }
    debug!("{host} resolved to {endpoints:?}");
    Ok(endpoints)
}

/// Connects to the endpoints in order; the first to accept wins.
///
/// The connect deadline covers the whole candidate walk.
async fn connect(
    endpoints: &[SocketAddr],
    config: &ClientConfig,
) -> Result<(TcpStream, SocketAddr), ClientError> {
    let attempt = async {
        let mut last_err = None;
        for &addr in endpoints {
            match TcpStream::connect(addr).await {
                Ok(stream) => return Ok((stream, addr)),
                Err(e) => {
                    debug!("Connect to {addr} failed: {e}");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, "no endpoints to connect to")
        }))
    };

    let (stream, addr) = with_deadline(config.connect_timeout, "connect", attempt)
        .await
        .map_err(ClientError::Connect)?;
    info!("Connected to {} at {addr}", config.host);
    Ok((stream, addr))
}

async fn handshake(
    tcp: TcpStream,
    host: &str,
    trust: &TrustContext,
    config: &ClientConfig,
) -> Result<Transport, ClientError> {
    let tls_config = build_client_config(trust, config.danger_accept_invalid_certs)
        .map_err(|e| ClientError::Handshake(io::Error::new(io::ErrorKind::Other, e)))?;

    let server_name = ServerName::try_from(host.to_string()).map_err(|e| {
        ClientError::Handshake(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid server name {host}: {e}"),
        ))
    })?;

    let connector = TlsConnector::from(tls_config);
    let stream = with_deadline(
        config.handshake_timeout,
        "TLS handshake",
        connector.connect(server_name, tcp),
    )
    .await
    .map_err(ClientError::Handshake)?;

    if let Some(version) = stream.get_ref().1.protocol_version() {
        debug!("Negotiated {version:?} with {host}");
    }
    Ok(Transport::Tls(Box::new(stream)))
}
