//! Client state machine.
//!
//! One `HttpClient` performs exactly one request attempt:
//! resolve → connect → (handshake) → write request → read status line →
//! read headers → either report the redirect or deliver the response and
//! stream its body. Exactly one of `on_response`, `on_redirect` or
//! `on_failure` is called per instance.
//!
//! Redirects are reported, never followed. To go to the new location the
//! caller builds a new client.

mod body;
mod state;

use std::sync::Arc;

use hickory_resolver::TokioAsyncResolver;
use log::{error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::ClientConfig;
use crate::connection::establish;
use crate::error_handling::ClientError;
use crate::models::{OutboundResponse, Outcome, StreamEnd};
use crate::parse::{classify_status, redirect_location, HeadReader, ReceiveBuffer, StatusClass};
use crate::pipe::data_pipe;
use crate::request::encode_request;

pub use body::stream_body;
pub use state::State;

/// Receives the single terminal report of a client instance.
pub trait ResponseHandler {
    /// Headers of a 2xx response have been parsed. The body keeps arriving
    /// on `response.body` after this returns, so the consumer must be read
    /// concurrently (e.g. from another task) or the stream stalls once the
    /// pipe is full.
    fn on_response(&mut self, response: OutboundResponse);

    /// A 301/302 named this location. No body follows.
    fn on_redirect(&mut self, location: String);

    fn on_failure(&mut self, error: ClientError);
}

/// A terminal report, as sent over a channel by [`HttpClient::spawn`].
#[derive(Debug)]
pub enum ClientEvent {
    Response(OutboundResponse),
    Redirect(String),
    Failure(ClientError),
}

// A dropped receiver means nobody wants the report. Dropping a Response event
// also drops its body consumer, which stops the stream cleanly.
impl ResponseHandler for mpsc::UnboundedSender<ClientEvent> {
    fn on_response(&mut self, response: OutboundResponse) {
        let _ = self.send(ClientEvent::Response(response));
    }

    fn on_redirect(&mut self, location: String) {
        let _ = self.send(ClientEvent::Redirect(location));
    }

    fn on_failure(&mut self, error: ClientError) {
        let _ = self.send(ClientEvent::Failure(error));
    }
}

/// A single-use HTTP(S) GET client.
///
/// # Examples
///
/// ```no_run
/// use wire_fetch::{init_resolver, ClientConfig, ClientEvent, HttpClient};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::from_url("https://example.com/")?;
/// let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();
///
/// if let Some(ClientEvent::Response(mut response)) = events.recv().await {
///     println!("{}", response.status_line);
///     let body = response.body.read_to_end().await;
///     println!("{} bytes", body.len());
/// }
/// let outcome = task.await?;
/// println!("{outcome:?}");
/// # Ok(())
/// # }
/// ```
pub struct HttpClient {
    config: ClientConfig,
    resolver: Arc<TokioAsyncResolver>,
    state: State,
}

impl HttpClient {
    pub fn new(config: ClientConfig, resolver: Arc<TokioAsyncResolver>) -> Self {
        Self {
            config,
            resolver,
            state: State::Idle,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Runs the request to its terminal outcome, reporting it to `handler`.
    ///
    /// Returns once the body has been streamed (or streaming stopped), the
    /// redirect reported, or the failure reported. The connection is closed
    /// on return.
    pub async fn run<H>(mut self, handler: &mut H) -> Outcome
    where
        H: ResponseHandler + ?Sized,
    {
        info!(
            "GET {}:{}{} ({})",
            self.config.host,
            self.config.port,
            self.config.path,
            self.config.transport.label()
        );

        match self.drive(handler).await {
            Ok(outcome) => {
                self.state.advance(State::Done);
                outcome
            }
            Err(err) => {
                error!(
                    "{}({}): {err}",
                    self.state.label(),
                    self.config.transport.label()
                );
                let kind = err.kind();
                self.state.advance(State::Failed);
                handler.on_failure(err);
                Outcome::Failed(kind)
            }
        }
    }

    /// Runs the request on its own task and reports through a channel.
    ///
    /// The receiver yields exactly one event; the join handle yields the
    /// outcome once the instance is finished.
    pub fn spawn(self) -> (JoinHandle<Outcome>, mpsc::UnboundedReceiver<ClientEvent>) {
        let (mut events, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move { self.run(&mut events).await });
        (handle, receiver)
    }

    async fn drive<H>(&mut self, handler: &mut H) -> Result<Outcome, ClientError>
    where
        H: ResponseHandler + ?Sized,
    {
        let mut connection = establish(&self.resolver, &self.config, &mut self.state).await?;
        let peer = connection.peer_addr();
        let transport = connection.transport_mut();

        self.state.advance(State::Writing);
        let request = encode_request(&self.config.host, &self.config.path);
        transport
            .write_all(&request)
            .await
            .map_err(ClientError::Write)?;
        transport.flush().await.map_err(ClientError::Write)?;

        let mut buffer = ReceiveBuffer::new();
        self.state.advance(State::ParsingStatus);
        let mut head = HeadReader::new(
            &mut *transport,
            &mut buffer,
            self.config.max_header_bytes,
            self.config.read_timeout,
        );
        let status = head.read_status_line().await?;
        let class = classify_status(status.code)?;

        self.state.advance(State::ParsingHeaders);
        let headers = head.read_headers().await?;

        if class == StatusClass::Redirect {
            let location = redirect_location(&headers)
                .map(str::to_string)
                .ok_or(ClientError::MissingRedirectLocation(status.code))?;
            info!("Redirecting to {location}");
            handler.on_redirect(location.clone());
            return Ok(Outcome::Redirected(location));
        }

        let (mut producer, consumer) = data_pipe(self.config.body_pipe_capacity);
        handler.on_response(OutboundResponse {
            status_code: status.code,
            status_line: status.composed(),
            headers,
            body: consumer,
        });

        self.state.advance(State::Streaming);
        let summary =
            stream_body(transport, &mut buffer, &mut producer, self.config.read_timeout).await;
        match summary.end {
            StreamEnd::Eof => info!("Received {} body bytes from {peer}", summary.bytes),
            StreamEnd::ConsumerClosed => {
                info!("Consumer stopped reading after {} bytes", summary.bytes)
            }
            StreamEnd::ReadFailed(kind) => {
                warn!("Body truncated after {} bytes: {kind}", summary.bytes)
            }
        }
        Ok(Outcome::Delivered(summary))
    }
}
