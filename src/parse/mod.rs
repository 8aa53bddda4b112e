//! Incremental parsing of the response head.
//!
//! The head is parsed in two phases over the same `ReceiveBuffer`: the status
//! line, then the header block up to the first empty line. Each phase reads
//! more from the transport only while its delimiter is missing. Whatever
//! follows the head stays buffered for the body streamer.

mod buffer;

use std::time::Duration;

use log::{debug, trace};
use tokio::io::AsyncRead;

use crate::error_handling::ClientError;
use crate::models::{Header, HeaderList, ParsedStatusLine};

pub use buffer::ReceiveBuffer;

/// How a status code is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    /// 200-299: deliver the response and stream the body.
    Success,
    /// 301, 302: report the `Location` and stop.
    Redirect,
}

/// Routes a status code. Anything other than 200-299, 301 and 302 is refused.
pub fn classify_status(code: u32) -> Result<StatusClass, ClientError> {
    match code {
        200..=299 => Ok(StatusClass::Success),
        301 | 302 => Ok(StatusClass::Redirect),
        other => Err(ClientError::UnsupportedStatusCode(other)),
    }
}

/// Parses one status line (with or without its trailing `\r`).
pub fn parse_status_line(line: &str) -> Result<ParsedStatusLine, ClientError> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    let (version, rest) = split_token(line.trim_start());
    if !version.starts_with("HTTP/") {
        return Err(ClientError::MalformedStatusLine(format!(
            "expected HTTP/ version, got {line:?}"
        )));
    }

    let (code, rest) = split_token(rest.trim_start());
    let code = code.parse::<u32>().map_err(|_| {
        ClientError::MalformedStatusLine(format!("invalid status code in {line:?}"))
    })?;

    Ok(ParsedStatusLine {
        version: version.to_string(),
        code,
        message: rest.trim_start().to_string(),
    })
}

/// Parses one header line: the name is everything before the first `:`, the
/// value everything after it minus leading spaces and anything from the
/// first `\r` on.
pub fn parse_header_line(line: &str) -> Result<Header, ClientError> {
    let Some((name, rest)) = line.split_once(':') else {
        return Err(ClientError::MalformedHeaderBlock(format!(
            "header line without ':': {line:?}"
        )));
    };
    let value = rest.trim_start_matches(' ');
    let value = value.split('\r').next().unwrap_or_default();
    Ok(Header::new(name, value))
}

/// The value of the last `Location` header, if any. Names are compared
/// exactly as received, so `location` does not match.
pub fn redirect_location(headers: &[Header]) -> Option<&str> {
    headers
        .iter()
        .rev()
        .find(|h| h.name == "Location")
        .map(|h| h.value.as_str())
}

fn split_token(s: &str) -> (&str, &str) {
    match s.find(char::is_whitespace) {
        Some(i) => s.split_at(i),
        None => (s, ""),
    }
}

enum LineRead {
    Line(String),
    NotUtf8,
    Eof,
    TooLarge,
}

/// Reads the response head from a transport through a `ReceiveBuffer`.
///
/// The status line and header block together may not exceed `max_head_bytes`.
pub struct HeadReader<'a, R: ?Sized> {
    reader: &'a mut R,
    buffer: &'a mut ReceiveBuffer,
    budget: usize,
    read_timeout: Option<Duration>,
}

impl<'a, R> HeadReader<'a, R>
where
    R: AsyncRead + Unpin + ?Sized,
{
    pub fn new(
        reader: &'a mut R,
        buffer: &'a mut ReceiveBuffer,
        max_head_bytes: usize,
        read_timeout: Option<Duration>,
    ) -> Self {
        Self {
            reader,
            buffer,
            budget: max_head_bytes,
            read_timeout,
        }
    }

    /// Reads and validates the status line.
    pub async fn read_status_line(&mut self) -> Result<ParsedStatusLine, ClientError> {
        match self.next_line().await? {
            LineRead::Line(line) => {
                let status = parse_status_line(&line)?;
                debug!("{} {} {}", status.version, status.code, status.message);
                Ok(status)
            }
            LineRead::NotUtf8 => Err(ClientError::MalformedStatusLine(
                "status line is not valid UTF-8".to_string(),
            )),
            LineRead::Eof => Err(ClientError::MalformedStatusLine(
                "connection closed before the status line ended".to_string(),
            )),
            LineRead::TooLarge => Err(ClientError::MalformedStatusLine(
                "status line exceeds the response head limit".to_string(),
            )),
        }
    }

    /// Reads header lines until the empty line ending the block.
    pub async fn read_headers(&mut self) -> Result<HeaderList, ClientError> {
        let mut headers = HeaderList::new();
        loop {
            match self.next_line().await? {
                LineRead::Line(line) if line.is_empty() || line == "\r" => {
                    return Ok(headers);
                }
                LineRead::Line(line) => {
                    let header = parse_header_line(&line)?;
                    trace!("{header}");
                    headers.push(header);
                }
                LineRead::NotUtf8 => {
                    return Err(ClientError::MalformedHeaderBlock(format!(
                        "header line {} is not valid UTF-8",
                        headers.len() + 1
                    )))
                }
                LineRead::Eof => {
                    return Err(ClientError::MalformedHeaderBlock(format!(
                        "connection closed after {} header(s) without an empty line",
                        headers.len()
                    )))
                }
                LineRead::TooLarge => {
                    return Err(ClientError::MalformedHeaderBlock(
                        "header block exceeds the response head limit".to_string(),
                    ))
                }
            }
        }
    }

    async fn next_line(&mut self) -> Result<LineRead, ClientError> {
        loop {
            if let Some(line) = self.buffer.take_line() {
                let used = line.len() + 1;
                if used > self.budget {
                    return Ok(LineRead::TooLarge);
                }
                self.budget -= used;
                // Bytes are never rewritten; a line that is not UTF-8 is refused
                return Ok(match std::str::from_utf8(line) {
                    Ok(text) => LineRead::Line(text.to_string()),
                    Err(_) => LineRead::NotUtf8,
                });
            }
            if self.buffer.len() >= self.budget {
                return Ok(LineRead::TooLarge);
            }
            let n = self
                .buffer
                .fill(&mut *self.reader, self.read_timeout)
                .await
                .map_err(ClientError::Read)?;
            if n == 0 {
                return Ok(LineRead::Eof);
            }
        }
    }
}

#[cfg(test)]
mod tests;
