//! TLS client setup.
//!
//! This module builds the `rustls` client configuration used when a request
//! runs over TLS:
//! - `TrustContext`: the certificate authorities supplied by the caller
//! - `ChainVerifier`: per-certificate trust decisions, logged by subject
//!
//! Uses `tokio-rustls` for the async handshake and `x509-parser` to read
//! certificate names for logging.

mod extract;
mod verify;

use std::sync::Arc;

use rustls::crypto::ring::default_provider;
use rustls::pki_types::CertificateDer;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};

pub use verify::{verify_certificate, ChainVerifier};

/// Certificate authorities a TLS client instance trusts.
///
/// Cheap to clone; the root store is shared.
#[derive(Debug, Clone)]
pub struct TrustContext {
    roots: Arc<RootCertStore>,
}

impl TrustContext {
    /// Trusts the Mozilla root program bundled by `webpki-roots`.
    pub fn webpki() -> Self {
        let mut root_store = RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        Self {
            roots: Arc::new(root_store),
        }
    }

    /// Trusts exactly the given DER-encoded CA certificates.
    ///
    /// # Errors
    ///
    /// Returns the `rustls` error for the first certificate that cannot be
    /// used as a trust anchor.
    pub fn from_der_certs<I>(certs: I) -> Result<Self, rustls::Error>
    where
        I: IntoIterator<Item = CertificateDer<'static>>,
    {
        let mut root_store = RootCertStore::empty();
        for cert in certs {
            root_store.add(cert)?;
        }
        Ok(Self {
            roots: Arc::new(root_store),
        })
    }

    /// Trusts nothing. Every chain fails preverification.
    pub fn empty() -> Self {
        Self {
            roots: Arc::new(RootCertStore::empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub(crate) fn roots(&self) -> Arc<RootCertStore> {
        Arc::clone(&self.roots)
    }
}

/// Builds the `rustls` client configuration for one TLS client instance.
///
/// # Errors
///
/// Returns an error if the crypto provider supports none of the default
/// protocol versions.
pub fn build_client_config(
    trust: &TrustContext,
    accept_invalid_certs: bool,
) -> Result<Arc<ClientConfig>, rustls::Error> {
    let provider = Arc::new(default_provider());
    let verifier = ChainVerifier::new(trust, Arc::clone(&provider), accept_invalid_certs);

    let config = ClientConfig::builder_with_provider(provider)
        .with_safe_default_protocol_versions()?
        .dangerous()
        .with_custom_certificate_verifier(Arc::new(verifier))
        .with_no_client_auth();
    Ok(Arc::new(config))
}
