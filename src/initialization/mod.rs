//! Process-level resource setup.
//!
//! This module provides functions to initialize the resources client
//! instances share:
//! - Logger (plain or JSON lines)
//! - DNS resolver
//! - TLS crypto provider

mod logger;
mod resolver;

use rustls::crypto::{ring::default_provider, CryptoProvider};

// Re-export public API
pub use logger::init_logger_with;
pub use resolver::init_resolver;

/// Installs `ring` as the process-wide `rustls` crypto provider.
///
/// Client TLS configurations pick the provider explicitly, so this only
/// matters to other `rustls` users in the same process.
pub fn init_crypto_provider() {
    // Reinstalling is harmless, so the result is ignored
    let _ = CryptoProvider::install_default(default_provider());
}
