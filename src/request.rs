//! Request encoding.

/// Builds the literal bytes of a single `GET` request.
///
/// `Connection: close` asks the peer to close the transport once the body is
/// sent, so end-of-stream is the only body terminator the streamer needs.
///
/// `host` and `path` are written verbatim; callers pass well-formed values.
pub fn encode_request(host: &str, path: &str) -> Vec<u8> {
    format!(
        "GET {path} HTTP/1.0\r\n\
         Host: {host}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n"
    )
    .into_bytes()
}
