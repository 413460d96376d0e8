// Copyright © 2024 Nathaniel Hardesty
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the “Software”), to
// deal in the Software without restriction, including without limitation the
// rights to use, copy, modify, merge, publish, distribute, sublicense, and/or
// sell copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in
// all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED “AS IS”, WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
// FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS
// IN THE SOFTWARE.

//! ## RECEIVE QUEUE
//!
//! A bounded FIFO of [`InboundMessage`]s handed from the reader thread to
//! whatever local consumer is pulling them off (the driver bridge or a
//! proxy consumer). Capacity is fixed at [`MAX_MESSAGES`]; once full, a new
//! arrival displaces the oldest entry rather than blocking the reader.
//! Indices are monotone, non-wrapping counters — only the slot index wraps.

use std::sync::Mutex;

use playernsd_wire::ClientId;

/// Capacity of the receive queue. Power of two, matching the daemon's own
/// client-side buffer sizing convention.
pub const MAX_MESSAGES: usize = 16384;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InboundMessage {
    /// Monotonic wall-clock timestamp, in seconds, of when this message was
    /// surfaced by the reader.
    pub timestamp: u64,
    pub source: ClientId,
    pub payload: Vec<u8>,
}

struct Inner {
    slots: Vec<Option<InboundMessage>>,
    head: u64,
    tail: u64,
    overflowed: bool,
}

pub struct ReceiveQueue {
    inner: Mutex<Inner>,
}

impl ReceiveQueue {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                slots: vec![None; MAX_MESSAGES],
                head: 0,
                tail: 0,
                overflowed: false,
            }),
        }
    }

    /// Pushes a newly-arrived message. If the queue is already at capacity
    /// the oldest entry is dropped and an overflow warning is logged, but
    /// only once per overflow episode (cleared once the queue is fully
    /// drained again).
    pub fn push(&self, msg: InboundMessage) {
        let mut inner = self.inner.lock().unwrap();
        if inner.head - inner.tail == MAX_MESSAGES as u64 {
            inner.tail += 1;
            if !inner.overflowed {
                log::warn!("playernsd-client: receive queue overflow, dropping oldest message");
                inner.overflowed = true;
            }
        }
        let idx = (inner.head % MAX_MESSAGES as u64) as usize;
        inner.slots[idx] = Some(msg);
        inner.head += 1;
    }

    /// Pops the oldest message, or `None` if the queue is empty.
    pub fn pop(&self) -> Option<InboundMessage> {
        let mut inner = self.inner.lock().unwrap();
        if inner.head == inner.tail {
            return None;
        }
        let idx = (inner.tail % MAX_MESSAGES as u64) as usize;
        let msg = inner.slots[idx].take();
        inner.tail += 1;
        if inner.head == inner.tail {
            inner.overflowed = false;
        }
        msg
    }

    pub fn len(&self) -> u64 {
        let inner = self.inner.lock().unwrap();
        inner.head - inner.tail
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ReceiveQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(n: u8) -> InboundMessage {
        InboundMessage {
            timestamp: n as u64,
            source: ClientId::new("bot1").unwrap(),
            payload: vec![n],
        }
    }

    #[test]
    fn fifo_order_is_preserved() {
        let queue = ReceiveQueue::new();
        queue.push(msg(1));
        queue.push(msg(2));
        assert_eq!(queue.pop().unwrap().payload, vec![1]);
        assert_eq!(queue.pop().unwrap().payload, vec![2]);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn overflow_drops_oldest_and_caps_at_max_messages() {
        let queue = ReceiveQueue::new();
        for n in 0..MAX_MESSAGES + 1 {
            queue.push(InboundMessage {
                timestamp: n as u64,
                source: ClientId::new("bot1").unwrap(),
                payload: vec![],
            });
        }
        assert_eq!(queue.len(), MAX_MESSAGES as u64);
        // the oldest surviving message is index 1, not 0
        assert_eq!(queue.pop().unwrap().timestamp, 1);
    }
}
