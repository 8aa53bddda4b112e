//! Parse module tests.

use super::*;
use crate::error_handling::ErrorKind;

async fn read_head(
    raw: &[u8],
    max: usize,
) -> (
    Result<ParsedStatusLine, ClientError>,
    Option<Result<HeaderList, ClientError>>,
    Vec<u8>,
) {
    let mut reader = raw;
    let mut buffer = ReceiveBuffer::new();
    let mut head = HeadReader::new(&mut reader, &mut buffer, max, None);
    let status = head.read_status_line().await;
    let headers = match status {
        Ok(_) => Some(head.read_headers().await),
        Err(_) => None,
    };
    let leftover = buffer.remaining().to_vec();
    (status, headers, leftover)
}

#[test]
fn test_parse_status_line_basic() {
    let status = parse_status_line("HTTP/1.0 200 OK\r").unwrap();
    assert_eq!(status.version, "HTTP/1.0");
    assert_eq!(status.code, 200);
    assert_eq!(status.message, "OK");
}

#[test]
fn test_parse_status_line_multi_word_message() {
    let status = parse_status_line("HTTP/1.1 302 Moved Temporarily").unwrap();
    assert_eq!(status.code, 302);
    assert_eq!(status.message, "Moved Temporarily");
}

#[test]
fn test_parse_status_line_without_message() {
    let status = parse_status_line("HTTP/1.1 204\r").unwrap();
    assert_eq!(status.code, 204);
    assert_eq!(status.message, "");
    assert_eq!(status.composed(), "HTTP/1.1 204");
}

#[test]
fn test_parse_status_line_rejects_non_http_version() {
    for line in ["ICY 200 OK\r", "http/1.0 200 OK", "", "\r", "SSH-2.0-OpenSSH"] {
        let err = parse_status_line(line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStatusLine, "{line:?}");
    }
}

#[test]
fn test_parse_status_line_rejects_non_numeric_code() {
    for line in ["HTTP/1.0 abc OK", "HTTP/1.0", "HTTP/1.0 -1 Nope", "HTTP/1.0 2x0 OK"] {
        let err = parse_status_line(line).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedStatusLine, "{line:?}");
    }
}

#[test]
fn test_classify_status_boundaries() {
    assert_eq!(classify_status(200).unwrap(), StatusClass::Success);
    assert_eq!(classify_status(204).unwrap(), StatusClass::Success);
    assert_eq!(classify_status(299).unwrap(), StatusClass::Success);
    assert_eq!(classify_status(301).unwrap(), StatusClass::Redirect);
    assert_eq!(classify_status(302).unwrap(), StatusClass::Redirect);
    for code in [100, 199, 300, 303, 304, 307, 308, 404, 500] {
        assert!(
            matches!(classify_status(code), Err(ClientError::UnsupportedStatusCode(c)) if c == code),
            "{code} should be unsupported"
        );
    }
}

#[test]
fn test_parse_header_line_strips_leading_spaces() {
    let header = parse_header_line("Name:  value\r").unwrap();
    assert_eq!(header.name, "Name");
    assert_eq!(header.value, "value");
}

#[test]
fn test_parse_header_line_keeps_case_and_inner_colons() {
    let header = parse_header_line("X-Forwarded-URL: http://a:8080/b").unwrap();
    assert_eq!(header.name, "X-Forwarded-URL");
    assert_eq!(header.value, "http://a:8080/b");
}

#[test]
fn test_parse_header_line_empty_value() {
    let header = parse_header_line("X-Empty:\r").unwrap();
    assert_eq!(header.name, "X-Empty");
    assert_eq!(header.value, "");
}

#[test]
fn test_parse_header_line_without_colon_is_malformed() {
    let err = parse_header_line("no colon here\r").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MalformedHeaderBlock);
}

#[test]
fn test_redirect_location_last_wins() {
    let headers = vec![
        Header::new("Location", "http://first/"),
        Header::new("Server", "test"),
        Header::new("Location", "http://second/"),
    ];
    assert_eq!(redirect_location(&headers), Some("http://second/"));
    assert_eq!(redirect_location(&headers[1..2]), None);
}

#[test]
fn test_redirect_location_name_is_case_sensitive() {
    let headers = vec![
        Header::new("location", "http://lower/"),
        Header::new("LOCATION", "http://upper/"),
    ];
    assert_eq!(redirect_location(&headers), None);

    let headers = vec![
        Header::new("Location", "http://exact/"),
        Header::new("location", "http://lower/"),
    ];
    assert_eq!(redirect_location(&headers), Some("http://exact/"));
}

#[tokio::test]
async fn test_head_reader_rejects_non_utf8_header_value() {
    let raw = b"HTTP/1.0 301 Moved\r\nLocation: http://x/caf\xe9\r\n\r\n";
    let (status, headers, _) = read_head(raw, 1024).await;
    assert_eq!(status.unwrap().code, 301);
    assert_eq!(
        headers.unwrap().unwrap_err().kind(),
        ErrorKind::MalformedHeaderBlock
    );
}

#[tokio::test]
async fn test_head_reader_rejects_non_utf8_status_line() {
    let (status, headers, _) = read_head(b"HTTP/1.0 200 \xffK\r\n\r\n", 1024).await;
    assert_eq!(status.unwrap_err().kind(), ErrorKind::MalformedStatusLine);
    assert!(headers.is_none());
}

#[tokio::test]
async fn test_head_reader_keeps_utf8_header_value_intact() {
    let raw = "HTTP/1.0 200 OK\r\nX-City: Montr\u{e9}al\r\n\r\n".as_bytes();
    let (_, headers, _) = read_head(raw, 1024).await;
    assert_eq!(
        headers.unwrap().unwrap(),
        vec![Header::new("X-City", "Montr\u{e9}al")]
    );
}

#[tokio::test]
async fn test_head_reader_leaves_body_buffered() {
    let raw = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\nX-Dup: 1\r\nX-Dup: 2\r\n\r\nhello";
    let (status, headers, leftover) = read_head(raw, 1024).await;
    let status = status.unwrap();
    assert_eq!(status.composed(), "HTTP/1.0 200OK");
    assert_eq!(
        headers.unwrap().unwrap(),
        vec![
            Header::new("Content-Type", "text/plain"),
            Header::new("X-Dup", "1"),
            Header::new("X-Dup", "2"),
        ]
    );
    assert_eq!(leftover, b"hello");
}

#[tokio::test]
async fn test_head_reader_accepts_bare_newlines() {
    let raw = b"HTTP/1.1 200 OK\nA: b\n\nbody";
    let (status, headers, leftover) = read_head(raw, 1024).await;
    assert_eq!(status.unwrap().code, 200);
    assert_eq!(headers.unwrap().unwrap(), vec![Header::new("A", "b")]);
    assert_eq!(leftover, b"body");
}

#[tokio::test]
async fn test_head_reader_status_line_eof() {
    let (status, headers, _) = read_head(b"HTTP/1.0 200 O", 1024).await;
    assert_eq!(status.unwrap_err().kind(), ErrorKind::MalformedStatusLine);
    assert!(headers.is_none());
}

#[tokio::test]
async fn test_head_reader_bad_version_skips_header_phase() {
    let (status, headers, leftover) = read_head(b"FTP/1.0 200 OK\r\nA: b\r\n\r\n", 1024).await;
    assert_eq!(status.unwrap_err().kind(), ErrorKind::MalformedStatusLine);
    assert!(headers.is_none());
    // header bytes were never consumed
    assert_eq!(leftover, b"A: b\r\n\r\n");
}

#[tokio::test]
async fn test_head_reader_truncated_header_block() {
    let (status, headers, _) = read_head(b"HTTP/1.0 200 OK\r\nA: b\r\n", 1024).await;
    assert!(status.is_ok());
    assert_eq!(
        headers.unwrap().unwrap_err().kind(),
        ErrorKind::MalformedHeaderBlock
    );
}

#[tokio::test]
async fn test_head_reader_enforces_size_limit() {
    let mut raw = b"HTTP/1.0 200 OK\r\n".to_vec();
    for i in 0..100 {
        raw.extend_from_slice(format!("X-Filler-{i}: {}\r\n", "a".repeat(50)).as_bytes());
    }
    raw.extend_from_slice(b"\r\n");
    let (status, headers, _) = read_head(&raw, 512).await;
    assert!(status.is_ok());
    assert_eq!(
        headers.unwrap().unwrap_err().kind(),
        ErrorKind::MalformedHeaderBlock
    );
}

#[tokio::test]
async fn test_head_reader_oversized_status_line() {
    let raw = format!("HTTP/1.0 200 {}\r\n\r\n", "x".repeat(200));
    let (status, _, _) = read_head(raw.as_bytes(), 64).await;
    assert_eq!(status.unwrap_err().kind(), ErrorKind::MalformedStatusLine);
}

#[tokio::test]
async fn test_head_reader_across_split_reads() {
    let (client, mut server) = tokio::io::duplex(64);
    let writer = tokio::spawn(async move {
        use tokio::io::AsyncWriteExt;
        for chunk in [&b"HTTP/1."[..], b"0 301 Moved\r", b"\nLocation: ", b"/next\r\n\r", b"\n"] {
            server.write_all(chunk).await.unwrap();
            tokio::task::yield_now().await;
        }
        server
    });

    let mut reader = client;
    let mut buffer = ReceiveBuffer::new();
    let mut head = HeadReader::new(&mut reader, &mut buffer, 1024, None);
    let status = head.read_status_line().await.unwrap();
    assert_eq!(status.code, 301);
    let headers = head.read_headers().await.unwrap();
    assert_eq!(redirect_location(&headers), Some("/next"));
    drop(writer.await.unwrap());
}
