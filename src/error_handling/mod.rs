//! Error handling.
//!
//! This module provides:
//! - `ClientError`, the terminal failure of a request attempt
//! - `ErrorKind`, its flat categorization for logging and reporting
//! - `InitializationError` for process-level setup
//!
//! Errors are categorized into:
//! - **Network**: resolution, connect, handshake, write, read
//! - **Protocol**: what the peer sent could not be accepted
//!
//! A consumer closing the body pipe is not an error and has no kind.

mod types;

// Re-export public API
pub use types::{ClientError, ErrorKind, InitializationError};
