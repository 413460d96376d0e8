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

//! ## RENDEZVOUS
//!
//! "One synchronous request, one asynchronous reply." [`RequestClientList`]
//! and [`PropertyGet`] are called from a middleware request thread, but
//! their replies only arrive later, on the reader thread. A [`Rendezvous`]
//! is a single-slot mailbox guarded by a mutex and a condition variable:
//! holding the mutex for the whole request/response window is what
//! enforces "at most one request of this kind in flight" (spec §4.4),
//! rather than a `HashMap` keyed by a per-request id — this protocol never
//! hands out one.
//!
//! [`RequestClientList`]: crate::ClientEngine::request_client_list
//! [`PropertyGet`]:        crate::ClientEngine::property_get

use std::sync::{Condvar, Mutex};

use crate::error::ClientError;

struct Slot<T> {
    ready: bool,
    value: Option<T>,
    disconnected: bool,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            ready: false,
            value: None,
            disconnected: false,
        }
    }
}

pub struct Rendezvous<T> {
    slot: Mutex<Slot<T>>,
    condvar: Condvar,
}

impl<T> Rendezvous<T> {
    pub fn new() -> Self {
        Self {
            slot: Mutex::new(Slot::default()),
            condvar: Condvar::new(),
        }
    }

    /// Runs one request/response cycle. `send` is invoked while holding the
    /// slot's mutex, after `ready` has been cleared, so any reply that
    /// arrives can only be meant for this request. Blocks until the reader
    /// calls [`fulfill`](Self::fulfill) or the connection is cancelled.
    pub fn request<F>(&self, send: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> Result<(), ClientError>,
    {
        let mut slot = self.slot.lock().unwrap();
        slot.ready = false;
        slot.value = None;
        send()?;
        while !slot.ready && !slot.disconnected {
            slot = self.condvar.wait(slot).unwrap();
        }
        if !slot.ready {
            return Err(ClientError::ConnectionLost);
        }
        slot.value.take().ok_or(ClientError::ConnectionLost)
    }

    /// Called by the reader on receiving the matching reply.
    pub fn fulfill(&self, value: T) {
        let mut slot = self.slot.lock().unwrap();
        slot.value = Some(value);
        slot.ready = true;
        self.condvar.notify_one();
    }

    /// Called on connection loss. Wakes any waiter with a failure.
    pub fn cancel(&self) {
        let mut slot = self.slot.lock().unwrap();
        slot.disconnected = true;
        self.condvar.notify_all();
    }

    /// Called when a new connection is established, clearing a stale
    /// disconnected flag from the previous one.
    pub fn reset(&self) {
        let mut slot = self.slot.lock().unwrap();
        *slot = Slot::default();
    }
}

impl<T> Default for Rendezvous<T> {
    fn default() -> Self {
        Self::new()
    }
}
