//! Append-only receive buffer with a read cursor.

use std::io;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::READ_CHUNK_SIZE;
use crate::utils::with_deadline;

/// Bytes read from the transport and not yet consumed.
///
/// Transport reads append at the back; parsing and streaming consume from the
/// front through the cursor. Consumed bytes are never looked at again, and
/// line searches resume where the previous unsuccessful search stopped.
#[derive(Debug, Default)]
pub struct ReceiveBuffer {
    data: Vec<u8>,
    cursor: usize,
    // bytes in data[cursor..scanned] are known to contain no '\n'
    scanned: usize,
}

impl ReceiveBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unconsumed bytes, oldest first.
    pub fn remaining(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    pub fn len(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Marks the first `n` unconsumed bytes as consumed.
    pub fn consume(&mut self, n: usize) {
        self.cursor += n.min(self.len());
        self.scanned = self.scanned.max(self.cursor);
        if self.cursor == self.data.len() {
            self.data.clear();
            self.cursor = 0;
            self.scanned = 0;
        }
    }

    /// Appends bytes as if they had been read from the transport.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Consumes and returns the next line without its `\n`, or `None` if no
    /// complete line is buffered yet. A `\r` before the `\n` is left in place.
    pub fn take_line(&mut self) -> Option<&[u8]> {
        let from = self.scanned.max(self.cursor);
        match self.data[from..].iter().position(|&b| b == b'\n') {
            Some(offset) => {
                let start = self.cursor;
                let end = from + offset;
                self.cursor = end + 1;
                self.scanned = self.cursor;
                Some(&self.data[start..end])
            }
            None => {
                self.scanned = self.data.len();
                None
            }
        }
    }

    /// Reads at least one more byte from `reader` into the buffer.
    ///
    /// Returns the number of bytes appended; `0` means end-of-stream.
    pub async fn fill<R>(&mut self, reader: &mut R, deadline: Option<Duration>) -> io::Result<usize>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        self.compact();
        self.data.reserve(READ_CHUNK_SIZE);
        let data = &mut self.data;
        with_deadline(deadline, "read", reader.read_buf(data)).await
    }

    // Drops consumed bytes once they make up at least half the storage
    fn compact(&mut self) {
        if self.cursor > 0 && self.cursor * 2 >= self.data.len() {
            self.data.drain(..self.cursor);
            self.scanned -= self.cursor;
            self.cursor = 0;
        }
    }
}
