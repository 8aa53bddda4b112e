//! Configuration constants.
//!
//! This module defines the defaults used when constructing a `ClientConfig`,
//! including timeouts, buffer sizes, and protocol limits.

use std::time::Duration;

// Network operation timeouts
/// DNS query timeout in seconds
/// Most DNS queries complete in <1s, 3s provides a good buffer while failing fast
pub const DNS_TIMEOUT_SECS: u64 = 3;
/// DNS query attempts per lookup
pub const DNS_ATTEMPTS: usize = 2;
/// TCP connection timeout in seconds
pub const TCP_CONNECT_TIMEOUT_SECS: u64 = 5;
/// TLS handshake timeout in seconds
pub const TLS_HANDSHAKE_TIMEOUT_SECS: u64 = 5;

/// Default TCP connect deadline applied per client instance.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(TCP_CONNECT_TIMEOUT_SECS);
/// Default TLS handshake deadline applied per client instance.
pub const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(TLS_HANDSHAKE_TIMEOUT_SECS);

// Ports
pub const DEFAULT_HTTP_PORT: u16 = 80;
pub const DEFAULT_HTTPS_PORT: u16 = 443;

// Buffer and size limits
/// Maximum size of the status line plus header block in bytes (64KB).
/// A peer that keeps sending header bytes past this is treated as malformed
/// rather than growing the receive buffer without bound.
pub const MAX_HEADER_BLOCK_SIZE: usize = 64 * 1024;
/// Default capacity of the bounded body pipe in bytes (64KB)
pub const DEFAULT_BODY_PIPE_CAPACITY: usize = 64 * 1024;
/// Minimum spare capacity reserved in the receive buffer before each transport read
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Default number of redirects the demo binary follows before giving up.
pub const DEFAULT_MAX_REDIRECTS: usize = 5;
