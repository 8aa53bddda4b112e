//! Body streaming under backpressure.

use std::io;
use std::time::Duration;

use log::{debug, error, trace};
use tokio::io::AsyncRead;

use crate::models::{StreamEnd, StreamSummary};
use crate::parse::ReceiveBuffer;
use crate::pipe::{BodySink, WriteResult};

enum Flush {
    Drained,
    ConsumerClosed,
}

/// Pushes every buffered byte into `sink`, waiting while it is full.
///
/// Bytes stay in the buffer until the sink accepts them, so a wait never
/// drops or repeats anything.
async fn flush<S>(buffer: &mut ReceiveBuffer, sink: &mut S, total: &mut u64) -> Flush
where
    S: BodySink,
{
    while !buffer.is_empty() {
        match sink.try_write(buffer.remaining()) {
            WriteResult::Accepted(0) | WriteResult::WouldBlock => {
                sink.wait_writable_or_closed().await;
            }
            WriteResult::Accepted(n) => {
                buffer.consume(n);
                *total += n as u64;
            }
            WriteResult::Closed => return Flush::ConsumerClosed,
        }
    }
    Flush::Drained
}

/// Streams the body: drains what is already buffered, then reads from the
/// transport until end-of-stream, writing everything into `sink` in order.
///
/// The sink is closed on every exit path. A consumer that closes the pipe
/// stops the loop before the next transport read, or during a read that is
/// still waiting on the peer.
///
/// A TLS peer that closes the TCP connection without `close_notify` shows up
/// as `UnexpectedEof`; with `Connection: close` framing that is the normal
/// end of the body, so it is treated like a clean end-of-stream.
pub async fn stream_body<R, S>(
    reader: &mut R,
    buffer: &mut ReceiveBuffer,
    sink: &mut S,
    read_timeout: Option<Duration>,
) -> StreamSummary
where
    R: AsyncRead + Unpin + ?Sized,
    S: BodySink,
{
    let mut bytes = 0u64;
    let end = loop {
        if let Flush::ConsumerClosed = flush(buffer, sink, &mut bytes).await {
            debug!("ReadBody: consumer closed the pipe after {bytes} bytes");
            break StreamEnd::ConsumerClosed;
        }

        // A consumer that leaves while the peer is silent ends the stream too
        let filled = tokio::select! {
            biased;
            _ = sink.wait_closed() => None,
            read = buffer.fill(reader, read_timeout) => Some(read),
        };
        let Some(read) = filled else {
            debug!("ReadBody: consumer closed the pipe while waiting for data");
            break StreamEnd::ConsumerClosed;
        };

        match read {
            Ok(0) => break StreamEnd::Eof,
            Ok(n) => trace!("ReadBody: {n} bytes"),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                debug!("ReadBody: peer closed without close_notify");
                break StreamEnd::Eof;
            }
            Err(e) => {
                error!("ReadBody: {e}");
                break StreamEnd::ReadFailed(e.kind());
            }
        }
    };

    sink.close();
    StreamSummary { bytes, end }
}
