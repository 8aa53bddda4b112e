//! Client configuration and constants.
//!
//! This module provides:
//! - Configuration constants (timeouts, limits, buffer sizes)
//! - The per-request `ClientConfig` and its `TransportMode`
//! - Command-line options and log level/format enums used by the binary

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{ClientConfig, LogFormat, LogLevel, Opt, TransportMode};

// Trust anchors are part of a TLS `TransportMode`
pub use crate::tls::TrustContext;
