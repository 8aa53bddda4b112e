//! Certificate field extraction.

use rustls::pki_types::CertificateDer;

/// Returns the subject distinguished name of a DER certificate, e.g.
/// `CN=localhost`, or `None` if the bytes do not parse as X.509.
pub(crate) fn certificate_subject(cert: &CertificateDer<'_>) -> Option<String> {
    x509_parser::parse_x509_certificate(cert.as_ref())
        .ok()
        .map(|(_, parsed)| parsed.tbs_certificate.subject.to_string())
}

/// Returns the issuer distinguished name of a DER certificate.
pub(crate) fn certificate_issuer(cert: &CertificateDer<'_>) -> Option<String> {
    x509_parser::parse_x509_certificate(cert.as_ref())
        .ok()
        .map(|(_, parsed)| parsed.tbs_certificate.issuer.to_string())
}
