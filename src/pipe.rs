//! Bounded byte pipe carrying response bodies to the consumer.
//!
//! The producer side is described by [`BodySink`]: a write either takes some
//! bytes, reports that the pipe is full (`WouldBlock`), or reports that the
//! consumer has gone away (`Closed`). [`data_pipe`] is the in-process
//! implementation handed to callers; the body streamer is written against the
//! trait so any bounded channel with the same contract can stand in.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

/// Result of a single non-blocking write attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteResult {
    /// This many leading bytes were taken; may be fewer than offered.
    Accepted(usize),
    /// No room right now; wait for the pipe to become writable.
    WouldBlock,
    /// The consumer closed its end; nothing will ever be read again.
    Closed,
}

/// Producer side of a bounded byte channel.
pub trait BodySink {
    /// Offers `data` to the channel without waiting.
    fn try_write(&mut self, data: &[u8]) -> WriteResult;

    /// Resolves once the channel has room or the consumer has closed it.
    fn wait_writable_or_closed(&mut self) -> impl Future<Output = ()> + Send;

    /// Resolves only once the consumer has closed the channel. Raced against
    /// transport reads so a consumer can stop a stalled stream.
    fn wait_closed(&mut self) -> impl Future<Output = ()> + Send;

    /// Releases the producer end. The consumer sees end-of-stream once it
    /// has drained what was written. Idempotent.
    fn close(&mut self);
}

#[derive(Debug)]
struct PipeState {
    buf: VecDeque<u8>,
    capacity: usize,
    producer_closed: bool,
    consumer_closed: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<PipeState>,
    // signalled when space frees up or the consumer leaves
    writable: Notify,
    // signalled when bytes arrive or the producer leaves
    readable: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PipeState> {
        // State stays consistent across a panicking holder; keep going
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates a pipe holding at most `capacity` unread bytes.
///
/// A `capacity` of zero is raised to one so the pipe can make progress.
pub fn data_pipe(capacity: usize) -> (PipeProducer, PipeConsumer) {
    let capacity = capacity.max(1);
    let shared = Arc::new(Shared {
        state: Mutex::new(PipeState {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            producer_closed: false,
            consumer_closed: false,
        }),
        writable: Notify::new(),
        readable: Notify::new(),
    });
    (
        PipeProducer {
            shared: Arc::clone(&shared),
        },
        PipeConsumer { shared },
    )
}

/// Write end of a [`data_pipe`]. Dropping it closes the pipe for writing.
#[derive(Debug)]
pub struct PipeProducer {
    shared: Arc<Shared>,
}

impl PipeProducer {
    /// True once the consumer has closed or dropped its end.
    pub fn is_closed(&self) -> bool {
        self.shared.lock().consumer_closed
    }
}

impl BodySink for PipeProducer {
    fn try_write(&mut self, data: &[u8]) -> WriteResult {
        let mut state = self.shared.lock();
        if state.consumer_closed {
            return WriteResult::Closed;
        }
        if data.is_empty() {
            return WriteResult::Accepted(0);
        }
        let room = state.capacity - state.buf.len();
        if room == 0 {
            return WriteResult::WouldBlock;
        }
        let n = room.min(data.len());
        state.buf.extend(&data[..n]);
        drop(state);
        self.shared.readable.notify_one();
        WriteResult::Accepted(n)
    }

    fn wait_writable_or_closed(&mut self) -> impl Future<Output = ()> + Send {
        let shared = Arc::clone(&self.shared);
        async move {
            loop {
                let notified = shared.writable.notified();
                tokio::pin!(notified);
                // Register before checking so a wakeup between check and await is not lost
                notified.as_mut().enable();
                {
                    let state = shared.lock();
                    if state.consumer_closed || state.buf.len() < state.capacity {
                        return;
                    }
                }
                notified.await;
            }
        }
    }

    fn wait_closed(&mut self) -> impl Future<Output = ()> + Send {
        let shared = Arc::clone(&self.shared);
        async move {
            loop {
                let notified = shared.writable.notified();
                tokio::pin!(notified);
                notified.as_mut().enable();
                let closed = shared.lock().consumer_closed;
                if closed {
                    return;
                }
                notified.await;
            }
        }
    }

    fn close(&mut self) {
        let mut state = self.shared.lock();
        if state.producer_closed {
            return;
        }
        state.producer_closed = true;
        drop(state);
        self.shared.readable.notify_one();
    }
}

impl Drop for PipeProducer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Read end of a [`data_pipe`]. Dropping it closes the pipe, which the
/// producer observes as [`WriteResult::Closed`].
#[derive(Debug)]
pub struct PipeConsumer {
    shared: Arc<Shared>,
}

impl PipeConsumer {
    /// Reads up to `out.len()` bytes, waiting until at least one is available.
    ///
    /// Returns `0` once the producer has closed and everything written has
    /// been read, or if `out` is empty.
    pub async fn read(&mut self, out: &mut [u8]) -> usize {
        if out.is_empty() {
            return 0;
        }
        loop {
            let notified = self.shared.readable.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            {
                let mut state = self.shared.lock();
                if !state.buf.is_empty() {
                    let n = out.len().min(state.buf.len());
                    for (slot, byte) in out.iter_mut().zip(state.buf.drain(..n)) {
                        *slot = byte;
                    }
                    drop(state);
                    self.shared.writable.notify_one();
                    return n;
                }
                if state.producer_closed {
                    return 0;
                }
            }
            notified.await;
        }
    }

    /// Reads until the producer closes and returns everything received.
    pub async fn read_to_end(&mut self) -> Vec<u8> {
        let mut body = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = self.read(&mut chunk).await;
            if n == 0 {
                return body;
            }
            body.extend_from_slice(&chunk[..n]);
        }
    }

    /// Closes the read end. Unread bytes are discarded.
    pub fn close(&mut self) {
        let mut state = self.shared.lock();
        if state.consumer_closed {
            return;
        }
        state.consumer_closed = true;
        state.buf.clear();
        drop(state);
        self.shared.writable.notify_one();
    }
}

impl Drop for PipeConsumer {
    fn drop(&mut self) {
        self.close();
    }
}
