//! Configuration types.
//!
//! This module defines the per-request client configuration and the enums
//! used by the binary for logger setup.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use url::Url;

use crate::config::constants::{
    DEFAULT_BODY_PIPE_CAPACITY, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HANDSHAKE_TIMEOUT,
    DEFAULT_HTTPS_PORT, DEFAULT_HTTP_PORT, DEFAULT_MAX_REDIRECTS, MAX_HEADER_BLOCK_SIZE,
};
use crate::error_handling::ClientError;
use crate::tls::TrustContext;

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options for the `wire-fetch` binary.
///
/// No flag disables certificate verification.
///
/// # Examples
///
/// ```bash
/// # Fetch a page, body to stdout, head to stderr
/// wire-fetch https://example.com/
///
/// # Do not follow redirects
/// wire-fetch http://example.com/old --max-redirects 0
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "wire-fetch",
    about = "Fetches one URL over a hand-rolled HTTP/1.0 GET and streams the body to stdout."
)]
pub struct Opt {
    /// Absolute http:// or https:// URL
    #[arg(value_parser)]
    pub url: String,

    /// Redirects to follow before giving up
    #[arg(long, default_value_t = DEFAULT_MAX_REDIRECTS)]
    pub max_redirects: usize,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

/// How the transport is set up after the TCP connect.
#[derive(Clone, Debug)]
pub enum TransportMode {
    /// Bytes go straight over the TCP socket.
    Plain,
    /// The socket is wrapped in TLS, verified against the given trust context.
    Tls(TrustContext),
}

impl TransportMode {
    pub fn is_tls(&self) -> bool {
        matches!(self, TransportMode::Tls(_))
    }

    /// Short label used in log lines.
    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Plain => "plain",
            TransportMode::Tls(_) => "TLS",
        }
    }
}

/// Immutable inputs for a single request attempt.
///
/// Built once and handed to `HttpClient::new`, which takes ownership. The
/// instance never mutates it.
///
/// # Examples
///
/// ```
/// use wire_fetch::{ClientConfig, TransportMode};
///
/// let config = ClientConfig::new("example.com", 80, "/index.html", TransportMode::Plain);
/// assert!(!config.danger_accept_invalid_certs);
///
/// let config = ClientConfig::from_url("https://example.com/a?b=c").unwrap();
/// assert_eq!(config.port, 443);
/// assert_eq!(config.path, "/a?b=c");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Host name (or IP literal) to resolve and send in the `Host` header
    pub host: String,

    /// TCP port
    pub port: u16,

    /// Request target sent verbatim on the request line
    pub path: String,

    /// Plain or TLS transport
    pub transport: TransportMode,

    /// Accept the peer's certificate chain even when verification fails.
    ///
    /// Diagnostic escape hatch only. Defaults to `false` and is never set from
    /// command-line or request input.
    pub danger_accept_invalid_certs: bool,

    /// Deadline for connecting to the resolved endpoints (`None` waits forever)
    pub connect_timeout: Option<Duration>,

    /// Deadline for the TLS handshake (`None` waits forever)
    pub handshake_timeout: Option<Duration>,

    /// Deadline for each individual transport read (`None` waits forever)
    pub read_timeout: Option<Duration>,

    /// Upper bound on status line plus header block size
    pub max_header_bytes: usize,

    /// Capacity of the bounded body pipe handed to the caller
    pub body_pipe_capacity: usize,
}

impl ClientConfig {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        path: impl Into<String>,
        transport: TransportMode,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            path: path.into(),
            transport,
            danger_accept_invalid_certs: false,
            connect_timeout: Some(DEFAULT_CONNECT_TIMEOUT),
            handshake_timeout: Some(DEFAULT_HANDSHAKE_TIMEOUT),
            read_timeout: None,
            max_header_bytes: MAX_HEADER_BLOCK_SIZE,
            body_pipe_capacity: DEFAULT_BODY_PIPE_CAPACITY,
        }
    }

    /// Like [`ClientConfig::new`], with the port given as text (`"8080"`).
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if `port` is not a number in `0..=65535`.
    pub fn from_parts(
        host: impl Into<String>,
        port: &str,
        path: impl Into<String>,
        transport: TransportMode,
    ) -> Result<Self, ClientError> {
        let host = host.into();
        let port = port
            .trim()
            .parse::<u16>()
            .map_err(|e| ClientError::InvalidUrl(format!("{host}: invalid port '{port}': {e}")))?;
        Ok(Self::new(host, port, path, transport))
    }

    /// Builds a configuration from an absolute `http` or `https` URL.
    ///
    /// `https` URLs verify against the bundled web PKI roots; use
    /// [`ClientConfig::with_trust`] to substitute another trust context.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::InvalidUrl` if the URL does not parse, has no
    /// host, or uses a scheme other than `http`/`https`.
    pub fn from_url(raw: &str) -> Result<Self, ClientError> {
        let url = Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))?;

        let (transport, default_port) = match url.scheme() {
            "http" => (TransportMode::Plain, DEFAULT_HTTP_PORT),
            "https" => (TransportMode::Tls(TrustContext::webpki()), DEFAULT_HTTPS_PORT),
            other => {
                return Err(ClientError::InvalidUrl(format!(
                    "{raw}: unsupported scheme '{other}'"
                )))
            }
        };

        let host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(ClientError::InvalidUrl(format!("{raw}: missing host"))),
        };
        // Url keeps the brackets on IPv6 literals; the resolver wants them bare
        let host = host
            .strip_prefix('[')
            .and_then(|h| h.strip_suffix(']'))
            .map(str::to_string)
            .unwrap_or(host);

        let mut path = url.path().to_string();
        if let Some(query) = url.query() {
            path.push('?');
            path.push_str(query);
        }

        let port = url.port().unwrap_or(default_port);
        Ok(Self::new(host, port, path, transport))
    }

    /// Replaces the trust context of a TLS configuration. Plain configurations
    /// are returned unchanged.
    pub fn with_trust(mut self, trust: TrustContext) -> Self {
        if self.transport.is_tls() {
            self.transport = TransportMode::Tls(trust);
        }
        self
    }
}
