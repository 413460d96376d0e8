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

//! # playernsd-client
//!
//! The dual-loop engine that speaks the `playernsd-wire` protocol against a
//! live daemon connection: a reader thread and a writer thread, a send
//! queue between them and anyone who wants to transmit, a rendezvous layer
//! for the two request kinds that expect an asynchronous reply
//! (list-clients, property-get), and a bounded receive queue for inbound
//! messages delivered to local consumers.
//!
//! This crate owns the socket and the connection state machine; it knows
//! nothing about the robotics middleware that sits on either side of it —
//! that bridging lives in `playernsd-driver` and `playernsd-proxy`.

mod engine;
mod error;
mod queue;
mod recvqueue;
mod rendezvous;

pub use engine::{ClientEngine, ClientHandler, ConnectionState, PropertyView};
pub use error::ClientError;
pub use queue::SendQueue;
pub use recvqueue::{InboundMessage, ReceiveQueue, MAX_MESSAGES};
pub use rendezvous::Rendezvous;

pub use playernsd_wire::{ClientId, ServerError, ID_WIDTH};
