//! wire_fetch library: a single-request async HTTP(S) GET client
//!
//! Each [`HttpClient`] instance performs one GET over a hand-rolled HTTP/1.0
//! exchange: it resolves the host, connects, optionally negotiates TLS,
//! parses the status line and headers, and then either reports a redirect
//! or hands the caller an [`OutboundResponse`] whose body keeps arriving on
//! a bounded pipe. The streamer only reads from the network while the pipe
//! has room, so a slow consumer throttles the download instead of growing
//! memory.
//!
//! # Example
//!
//! ```no_run
//! use wire_fetch::{init_resolver, ClientConfig, HttpClient, ClientEvent};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ClientConfig::from_url("http://example.com/")?;
//! let (task, mut events) = HttpClient::new(config, init_resolver()).spawn();
//!
//! match events.recv().await {
//!     Some(ClientEvent::Response(mut response)) => {
//!         let body = response.body.read_to_end().await;
//!         println!("{} ({} bytes)", response.status_line, body.len());
//!     }
//!     Some(ClientEvent::Redirect(location)) => println!("moved to {location}"),
//!     Some(ClientEvent::Failure(e)) => eprintln!("failed: {e}"),
//!     None => {}
//! }
//! task.await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

pub mod config;
pub mod connection;
mod error_handling;
mod fetch;
pub mod initialization;
mod models;
pub mod parse;
pub mod pipe;
pub mod request;
pub mod tls;
mod utils;

// Re-export public API
pub use config::{ClientConfig, LogFormat, LogLevel, Opt, TransportMode};
pub use error_handling::{ClientError, ErrorKind, InitializationError};
pub use fetch::{stream_body, ClientEvent, HttpClient, ResponseHandler, State};
pub use initialization::init_resolver;
pub use models::{
    Header, HeaderList, OutboundResponse, Outcome, ParsedStatusLine, StreamEnd, StreamSummary,
};
pub use pipe::{data_pipe, BodySink, PipeConsumer, PipeProducer, WriteResult};
pub use tls::TrustContext;
