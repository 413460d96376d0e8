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

//! ## SEND QUEUE
//!
//! A thread-safe FIFO of already-serialized outgoing byte sequences, sitting
//! between however many callers want to write to the connection and the
//! single writer thread that owns the socket. `push` never blocks; `pop`
//! blocks until a frame is available or the queue is closed, at which point
//! it returns `None` so the writer loop can drain and exit.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Mutex;

use crate::error::ClientError;

enum Item {
    Frame(Vec<u8>),
    Close,
}

pub struct SendQueue {
    sender: Sender<Item>,
    receiver: Mutex<Receiver<Item>>,
}

impl SendQueue {
    pub fn new() -> Self {
        let (sender, receiver) = channel();
        Self {
            sender,
            receiver: Mutex::new(receiver),
        }
    }

    /// Enqueues one already-framed outgoing message. Non-blocking.
    pub fn push(&self, frame: Vec<u8>) -> Result<(), ClientError> {
        self.sender
            .send(Item::Frame(frame))
            .map_err(|_| ClientError::NotConnected)
    }

    /// Enqueues the close sentinel. Any frames already queued ahead of it
    /// are still written before the writer loop sees the sentinel and exits.
    pub fn close(&self) {
        let _ = self.sender.send(Item::Close);
    }

    /// Blocks until a frame is ready or the queue is closed.
    pub fn pop(&self) -> Option<Vec<u8>> {
        match self.receiver.lock().unwrap().recv() {
            Ok(Item::Frame(frame)) => Some(frame),
            Ok(Item::Close) | Err(_) => None,
        }
    }
}

impl Default for SendQueue {
    fn default() -> Self {
        Self::new()
    }
}
