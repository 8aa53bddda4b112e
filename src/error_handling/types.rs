//! Error type definitions.
//!
//! This module defines the errors a client instance can terminate with, the
//! flat `ErrorKind` used for reporting, and initialization errors.

use std::io;

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Terminal failure of a single request attempt.
///
/// Every variant is final for the instance that produced it: nothing is
/// retried internally. Retrying, re-resolving, or trying another endpoint is
/// up to the caller.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The host name could not be resolved to any endpoint.
    #[error("Resolution error for {host}: {message}")]
    Resolution { host: String, message: String },

    /// No resolved endpoint accepted the TCP connection.
    #[error("Connect error: {0}")]
    Connect(#[source] io::Error),

    /// The TLS handshake failed (including certificate rejection).
    #[error("Handshake error: {0}")]
    Handshake(#[source] io::Error),

    /// Writing the request to the transport failed.
    #[error("Write error: {0}")]
    Write(#[source] io::Error),

    /// The first line of the response is not a valid HTTP status line.
    #[error("Malformed status line: {0}")]
    MalformedStatusLine(String),

    /// The status code is outside 200-299, 301, 302.
    #[error("Unsupported status code: {0}")]
    UnsupportedStatusCode(u32),

    /// The header block is truncated, oversized, or contains a line without ':'.
    #[error("Malformed header block: {0}")]
    MalformedHeaderBlock(String),

    /// A 301/302 response carried no `Location` header.
    #[error("Redirect status {0} without a Location header")]
    MissingRedirectLocation(u32),

    /// Reading from the transport failed before the response head was parsed.
    #[error("Read error: {0}")]
    Read(#[source] io::Error),

    /// The URL handed to `ClientConfig::from_url` cannot be fetched.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Returns the flat kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Resolution { .. } => ErrorKind::ResolutionError,
            ClientError::Connect(_) => ErrorKind::ConnectError,
            ClientError::Handshake(_) => ErrorKind::HandshakeError,
            ClientError::Write(_) => ErrorKind::WriteError,
            ClientError::MalformedStatusLine(_) => ErrorKind::MalformedStatusLine,
            ClientError::UnsupportedStatusCode(_) => ErrorKind::UnsupportedStatusCode,
            ClientError::MalformedHeaderBlock(_) => ErrorKind::MalformedHeaderBlock,
            ClientError::MissingRedirectLocation(_) => ErrorKind::MissingRedirectLocation,
            ClientError::Read(_) => ErrorKind::ReadError,
            ClientError::InvalidUrl(_) => ErrorKind::InvalidUrl,
        }
    }
}

/// Flat categorization of `ClientError`, cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum ErrorKind {
    // Network errors
    ResolutionError,
    ConnectError,
    HandshakeError,
    WriteError,
    ReadError,
    // Protocol errors
    MalformedStatusLine,
    UnsupportedStatusCode,
    MalformedHeaderBlock,
    MissingRedirectLocation,
    // Input errors
    InvalidUrl,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResolutionError => "DNS resolution error",
            ErrorKind::ConnectError => "TCP connect error",
            ErrorKind::HandshakeError => "TLS handshake error",
            ErrorKind::WriteError => "Request write error",
            ErrorKind::ReadError => "Response read error",
            ErrorKind::MalformedStatusLine => "Malformed status line",
            ErrorKind::UnsupportedStatusCode => "Unsupported status code",
            ErrorKind::MalformedHeaderBlock => "Malformed header block",
            ErrorKind::MissingRedirectLocation => "Redirect without Location",
            ErrorKind::InvalidUrl => "Invalid URL",
        }
    }

    /// True for failures caused by the network rather than by what the peer sent.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ErrorKind::ResolutionError
                | ErrorKind::ConnectError
                | ErrorKind::HandshakeError
                | ErrorKind::WriteError
                | ErrorKind::ReadError
        )
    }
}
