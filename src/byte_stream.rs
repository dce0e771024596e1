//! A bounded producer/consumer byte buffer with close and sticky-error
//! semantics. A single owned type exposes both the writer and reader
//! operation groups — there is no separate `Reader`/`Writer` handle pair,
//! just two groups of methods on one buffer.

use std::collections::VecDeque;

#[derive(Debug)]
pub struct ByteStream {
    capacity: usize,
    buffer: VecDeque<u8>,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        ByteStream {
            capacity,
            buffer: VecDeque::with_capacity(capacity.min(4096)),
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    /// Accepts at most `available_capacity()` bytes of `data`, silently
    /// truncating the rest. No-op once closed.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed {
            return;
        }
        let room = self.available_capacity();
        let take = data.len().min(room);
        if take < data.len() {
            log::trace!(
                "ByteStream::push truncated {} of {} bytes (available_capacity={})",
                data.len() - take,
                data.len(),
                room
            );
        }
        self.buffer.extend(&data[..take]);
        self.bytes_pushed += take as u64;
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }

    /// A contiguous prefix of the currently buffered bytes. `VecDeque`
    /// doesn't guarantee one contiguous slice once it has wrapped around its
    /// backing storage, so this returns only the first (front) slice; callers
    /// that need everything should `pop` and re-`peek` in a loop.
    pub fn peek(&self) -> &[u8] {
        self.buffer.as_slices().0
    }

    pub fn pop(&mut self, n: usize) {
        let n = n.min(self.bytes_buffered());
        self.buffer.drain(..n);
        self.bytes_popped += n as u64;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity - self.bytes_buffered()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    pub fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_finished(&self) -> bool {
        self.closed && self.bytes_buffered() == 0
    }

    pub fn has_error(&self) -> bool {
        self.error
    }
}
