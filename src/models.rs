use std::fmt;

use crate::error_handling::ErrorKind;
use crate::pipe::PipeConsumer;

/// First line of an HTTP response, split into its three parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedStatusLine {
    /// Protocol token, always starting with `HTTP/`
    pub version: String,
    pub code: u32,
    /// Rest of the line after the code, without leading whitespace or `\r`
    pub message: String,
}

impl ParsedStatusLine {
    /// Status line as reported to the caller: version, a space, the code,
    /// then the message with no separator (`HTTP/1.0 200OK`).
    pub fn composed(&self) -> String {
        format!("{} {}{}", self.version, self.code, self.message)
    }
}

/// One response header, exactly as received. Names keep their case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: String,
}

impl Header {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.value)
    }
}

/// Headers in arrival order. Duplicates are kept as separate entries.
pub type HeaderList = Vec<Header>;

/// A success-class response handed to the caller before its body is read.
///
/// Body bytes keep arriving on `body` after this is delivered; the pipe
/// reaches end-of-stream when the transport does, or early if streaming fails.
#[derive(Debug)]
pub struct OutboundResponse {
    pub status_code: u32,
    pub status_line: String,
    pub headers: HeaderList,
    pub body: PipeConsumer,
}

impl OutboundResponse {
    /// Value of the first header whose name matches, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }
}

/// Why body streaming stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamEnd {
    /// The transport reached end-of-stream; the body is complete.
    Eof,
    /// The consumer closed the pipe; no further reads were issued.
    ConsumerClosed,
    /// A transport read failed mid-body; the consumer sees a truncated body.
    ReadFailed(std::io::ErrorKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Bytes accepted by the pipe
    pub bytes: u64,
    pub end: StreamEnd,
}

/// Terminal outcome of one client instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Delivered(StreamSummary),
    Redirected(String),
    Failed(ErrorKind),
}
