//! Per-certificate trust decisions during the TLS handshake.
//!
//! `rustls` verifies a chain as a whole. `ChainVerifier` runs the web PKI
//! verification once to get the preverification verdict, then walks the
//! presented chain from the leaf toward the root and asks
//! [`verify_certificate`] for a decision on each certificate. The chain is
//! accepted only if every certificate is.

use std::sync::Arc;

use log::{debug, info, warn};
use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::client::WebPkiServerVerifier;
use rustls::crypto::{verify_tls12_signature, verify_tls13_signature, CryptoProvider};
use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
use rustls::{CertificateError, DigitallySignedStruct, Error as TlsError, SignatureScheme};

use super::extract::{certificate_issuer, certificate_subject};
use super::TrustContext;

/// Decides whether a single certificate in the peer's chain is trusted.
///
/// Returns `preverified` unchanged unless `accept_invalid_certs` is set, in
/// which case every certificate is accepted. Logs the certificate subject.
pub fn verify_certificate(
    preverified: bool,
    cert: &CertificateDer<'_>,
    depth: usize,
    accept_invalid_certs: bool,
) -> bool {
    let subject =
        certificate_subject(cert).unwrap_or_else(|| "<unparseable certificate>".to_string());
    info!("Verifying {subject}");
    if let Some(issuer) = certificate_issuer(cert) {
        debug!("depth={depth} issuer={issuer} preverified={preverified}");
    }

    if !preverified && accept_invalid_certs {
        warn!("Accepting {subject} despite failed verification (danger_accept_invalid_certs)");
        return true;
    }
    preverified
}

/// `rustls` server certificate verifier that routes every certificate in the
/// chain through [`verify_certificate`].
#[derive(Debug)]
pub struct ChainVerifier {
    // None when the trust context has no anchors; nothing can preverify then
    webpki: Option<Arc<WebPkiServerVerifier>>,
    provider: Arc<CryptoProvider>,
    accept_invalid_certs: bool,
}

impl ChainVerifier {
    pub fn new(
        trust: &TrustContext,
        provider: Arc<CryptoProvider>,
        accept_invalid_certs: bool,
    ) -> Self {
        let webpki = if trust.is_empty() {
            None
        } else {
            WebPkiServerVerifier::builder_with_provider(trust.roots(), provider.clone())
                .build()
                .map_err(|e| warn!("Web PKI verifier unavailable: {e}"))
                .ok()
        };
        Self {
            webpki,
            provider,
            accept_invalid_certs,
        }
    }
}

impl ServerCertVerifier for ChainVerifier {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        ocsp_response: &[u8],
        now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        let verdict = match &self.webpki {
            Some(webpki) => webpki.verify_server_cert(
                end_entity,
                intermediates,
                server_name,
                ocsp_response,
                now,
            ),
            None => Err(TlsError::InvalidCertificate(CertificateError::UnknownIssuer)),
        };
        let preverified = verdict.is_ok();

        // Every certificate is visited so each one is logged
        let mut accepted = true;
        for (depth, cert) in std::iter::once(end_entity).chain(intermediates).enumerate() {
            accepted &= verify_certificate(preverified, cert, depth, self.accept_invalid_certs);
        }

        match verdict {
            Ok(verified) if accepted => Ok(verified),
            Err(_) if accepted => Ok(ServerCertVerified::assertion()),
            Ok(_) => Err(TlsError::InvalidCertificate(
                CertificateError::ApplicationVerificationFailure,
            )),
            Err(e) => Err(e),
        }
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls12_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        verify_tls13_signature(
            message,
            cert,
            dss,
            &self.provider.signature_verification_algorithms,
        )
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        self.provider
            .signature_verification_algorithms
            .supported_schemes()
    }
}
